//! Unit tests for error handling

use super::*;
use std::io;

#[cfg(test)]
mod lake_error_tests {
    use super::*;

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let lake_error = LakeError::from(json_error);

        match lake_error {
            LakeError::Json(_) => (),
            _ => panic!("Expected Json error variant"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let lake_error = LakeError::from(io_error);

        match lake_error {
            LakeError::Io(_) => (),
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_date_error_conversion() {
        let parse_error = chrono::NaiveDate::parse_from_str("not-a-date", "%Y-%m-%d").unwrap_err();
        let lake_error = LakeError::from(parse_error);

        assert!(matches!(lake_error, LakeError::Date(_)));
    }

    #[test]
    fn test_status_error_display() {
        let error = LakeError::Status {
            url: "https://api.sleeper.app/v1/league/1".to_string(),
            status: 404,
            body: "not found".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "https://api.sleeper.app/v1/league/1 returned status 404: not found"
        );
    }

    #[test]
    fn test_missing_config_display() {
        let error = LakeError::MissingConfig {
            env_var: "GCS_BUCKET_NAME".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "GCS_BUCKET_NAME environment variable not set"
        );
    }

    #[test]
    fn test_multiple_current_display() {
        let error = LakeError::MultipleCurrent {
            key: "123".to_string(),
            count: 2,
        };
        assert!(error.to_string().contains("123"));
        assert!(error.to_string().contains('2'));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LakeError>();
    }
}
