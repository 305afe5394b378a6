//! Вывод страницы списка: поиск → фильтр по отделениям → сортировка →
//! пагинация. Чистая функция над срезом записей, без DOM и без сигналов,
//! чтобы инварианты можно было проверить обычным `cargo test`.

use crate::domain::a001_device::DeviceRecord;
use std::collections::HashSet;

/// Fixed page size of the device list.
pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Model,
    SerialNumber,
    Department,
    ExpiryDate,
    /// Фото не сортируется: компаратор-заглушка сохраняет текущий порядок.
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Производное состояние списка. Не персистится; страница 0-индексная.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub search_text: String,
    /// Пустое множество = фильтр выключен.
    pub departments: HashSet<String>,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
    pub page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            departments: HashSet::new(),
            sort_key: SortKey::Name,
            sort_direction: SortDirection::Asc,
            page: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceListPage {
    pub items: Vec<DeviceRecord>,
    pub total_count: usize,
    pub total_pages: usize,
}

fn compare(a: &DeviceRecord, b: &DeviceRecord, key: SortKey) -> std::cmp::Ordering {
    match key {
        SortKey::Name => a.name.cmp(&b.name),
        SortKey::Model => a.model.cmp(&b.model),
        SortKey::SerialNumber => a.serial_number.cmp(&b.serial_number),
        SortKey::Department => a.department.cmp(&b.department),
        SortKey::ExpiryDate => a.expiry_date.cmp(&b.expiry_date),
        SortKey::Image => std::cmp::Ordering::Equal,
    }
}

/// Поиск + фильтр + сортировка без пагинации: этим же списком пользуется
/// PDF-отчёт по текущему представлению.
pub fn filter_and_sort(records: &[DeviceRecord], state: &ViewState) -> Vec<DeviceRecord> {
    let needle = state.search_text.to_lowercase();

    let mut filtered: Vec<DeviceRecord> = records
        .iter()
        .filter(|r| r.matches_search(&needle))
        .filter(|r| state.departments.is_empty() || state.departments.contains(&r.department))
        .cloned()
        .collect();

    // стабильная сортировка после поиска и фильтра
    filtered.sort_by(|a, b| {
        let ord = compare(a, b, state.sort_key);
        match state.sort_direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });

    filtered
}

/// Derive the visible page. The requested page is clamped to the computed
/// page count, so a stale page number after a filter change can never index
/// past the end.
pub fn derive_view(records: &[DeviceRecord], state: &ViewState) -> DeviceListPage {
    let filtered = filter_and_sort(records, state);

    let total_count = filtered.len();
    let total_pages = total_count.div_ceil(PAGE_SIZE);
    let page = state.page.min(total_pages.saturating_sub(1));

    let items = filtered
        .into_iter()
        .skip(page * PAGE_SIZE)
        .take(PAGE_SIZE)
        .collect();

    DeviceListPage {
        items,
        total_count,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, serial: &str, department: &str, expiry: &str) -> DeviceRecord {
        DeviceRecord {
            name: name.to_string(),
            model: format!("M-{}", serial),
            serial_number: serial.to_string(),
            department: department.to_string(),
            expiry_date: expiry.to_string(),
            image_url: None,
        }
    }

    fn sample(n: usize) -> Vec<DeviceRecord> {
        (0..n)
            .map(|i| {
                record(
                    &format!("Device {:02}", i),
                    &format!("SN{:02}", i),
                    if i % 2 == 0 { "ICU" } else { "ER" },
                    &format!("2025-01-{:02}", (i % 28) + 1),
                )
            })
            .collect()
    }

    #[test]
    fn total_pages_is_ceil_of_filtered_count() {
        let state = ViewState::default();
        assert_eq!(derive_view(&sample(0), &state).total_pages, 0);
        assert_eq!(derive_view(&sample(10), &state).total_pages, 1);
        assert_eq!(derive_view(&sample(11), &state).total_pages, 2);
        assert_eq!(derive_view(&sample(25), &state).total_pages, 3);
    }

    #[test]
    fn page_is_clamped_to_last() {
        let state = ViewState {
            page: 99,
            ..Default::default()
        };
        let page = derive_view(&sample(25), &state);
        // clamped to the last page, which holds the 5 remaining items
        assert_eq!(page.items.len(), 5);
    }

    #[test]
    fn search_is_case_insensitive_or_across_fields() {
        let records = vec![
            record("Ventilator", "SN1", "ICU", "2025-01-01"),
            record("Pump", "VENT-SN", "ER", "2025-01-01"),
            record("Monitor", "SN3", "ER", "2025-01-01"),
        ];
        let state = ViewState {
            search_text: "vent".to_string(),
            ..Default::default()
        };
        let page = derive_view(&records, &state);
        assert_eq!(page.total_count, 2); // name match + serial match
    }

    #[test]
    fn empty_department_set_means_no_filtering() {
        let state = ViewState::default();
        assert_eq!(derive_view(&sample(6), &state).total_count, 6);

        let state = ViewState {
            departments: HashSet::from(["ICU".to_string()]),
            ..Default::default()
        };
        assert_eq!(derive_view(&sample(6), &state).total_count, 3);
    }

    #[test]
    fn sort_direction_reverses_order() {
        let records = sample(3);
        let asc = derive_view(&records, &ViewState::default());
        let desc = derive_view(
            &records,
            &ViewState {
                sort_direction: SortDirection::Desc,
                ..Default::default()
            },
        );
        let mut reversed = desc.items.clone();
        reversed.reverse();
        assert_eq!(asc.items, reversed);
    }

    #[test]
    fn image_sort_keeps_current_order() {
        let records = vec![
            record("B", "SN2", "ICU", "2025-01-01"),
            record("A", "SN1", "ICU", "2025-01-01"),
        ];
        let state = ViewState {
            sort_key: SortKey::Image,
            ..Default::default()
        };
        let page = derive_view(&records, &state);
        // стабильная сортировка с равным компаратором = исходный порядок
        assert_eq!(page.items[0].name, "B");
        assert_eq!(page.items[1].name, "A");
    }
}
