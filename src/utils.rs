/// Utility functions for timestamp derivation and log formatting
use time::{format_description, OffsetDateTime};

/// Interpret an epoch-seconds value as an absolute UTC timestamp
///
/// All Tempest messages carry time as whole Unix seconds. Values outside
/// the representable range fall back to the Unix epoch.
pub fn epoch_to_datetime(epoch: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(epoch).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

/// Format a timestamp for human-readable logging
///
/// Converts an OffsetDateTime to DD.MM.YYYY - HH:MM:SS format
/// Falls back to default string representation if formatting fails.
pub fn format_datetime(dt: &OffsetDateTime) -> String {
    let format = format_description::parse("[day].[month].[year] - [hour]:[minute]:[second]")
        .expect("Failed to create format description");
    dt.format(&format).unwrap_or_else(|_| dt.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_round_trips_through_datetime() {
        let dt = epoch_to_datetime(1597165492);
        assert_eq!(dt.unix_timestamp(), 1597165492);
    }

    #[test]
    fn out_of_range_epoch_falls_back_to_unix_epoch() {
        assert_eq!(epoch_to_datetime(i64::MAX).unix_timestamp(), 0);
    }

    #[test]
    fn formats_datetime_for_logging() {
        let dt = epoch_to_datetime(1597165492);
        assert_eq!(format_datetime(&dt), "11.08.2020 - 17:04:52");
    }
}
