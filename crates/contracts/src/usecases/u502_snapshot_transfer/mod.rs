pub mod codec;

pub use codec::{
    decode_snapshot, encode_snapshot, encode_snapshot_pretty, select_channel, SnapshotError,
    TransferChannel, QR_PAYLOAD_MAX_BYTES,
};

use crate::usecases::common::UseCaseMetadata;

pub struct SnapshotTransfer;

impl UseCaseMetadata for SnapshotTransfer {
    fn usecase_index() -> &'static str {
        "u502"
    }

    fn usecase_name() -> &'static str {
        "snapshot_transfer"
    }

    fn display_name() -> &'static str {
        "Передача снимка данных (QR / файл)"
    }

    fn description() -> &'static str {
        "Сериализация всего хранилища в JSON и выбор канала переноса по размеру"
    }
}
