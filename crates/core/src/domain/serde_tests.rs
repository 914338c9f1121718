#[cfg(test)]
mod tests {
    use crate::domain::api::{ProcessFolderResponse, Status};
    use crate::domain::error::{AppError, ErrorCode};
    use crate::domain::ingest::{BatchReport, FileReport};
    use crate::domain::settings::AppSettings;
    use crate::domain::types::{RewriteRequest, SourceFormat, Tone};

    #[test]
    fn test_tone_serialization() {
        assert_eq!(serde_json::to_string(&Tone::Professional).unwrap(), "\"professional\"");
        assert_eq!(serde_json::to_string(&Tone::Academic).unwrap(), "\"academic\"");
        assert_eq!(serde_json::from_str::<Tone>("\"casual\"").unwrap(), Tone::Casual);
        assert!(serde_json::from_str::<Tone>("\"pirate\"").is_err());
    }

    #[test]
    fn test_rewrite_request_defaults() {
        let json = r#"{"email_text": "hello", "target_audience": "the team"}"#;
        let req: RewriteRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.tone, Tone::Professional);
        assert!(req.save_output);
        assert!(req.focus_areas.is_none());
        assert!(req.constraints.is_none());
        assert!(req.correlation_id.is_none());
    }

    #[test]
    fn test_rewrite_request_full() {
        let json = r#"{
            "email_text": "hello",
            "target_audience": "the team",
            "tone": "academic",
            "focus_areas": ["results"],
            "constraints": {"max_length": 120, "avoid": ["jargon"]},
            "save_output": false,
            "correlation_id": "abc"
        }"#;
        let req: RewriteRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.tone, Tone::Academic);
        assert!(!req.save_output);
        let constraints = req.constraints.unwrap();
        assert_eq!(constraints.max_length, Some(120));
        assert!(constraints.must_include.is_empty());
        assert_eq!(constraints.avoid, vec!["jargon"]);
    }

    #[test]
    fn test_app_error_serialization() {
        let err = AppError::validation("email_text must not be empty");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "E_VALIDATION");
        assert_eq!(json["recoverable"], true);
        assert!(json.get("suggestion").is_none());

        let err = AppError::configuration("OpenAI API key is not configured");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "E_CONFIGURATION");
        assert_eq!(json["recoverable"], false);
        assert!(json["suggestion"].as_str().unwrap().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_error_code_serialization() {
        assert_eq!(
            serde_json::to_string(&ErrorCode::EmptyOrUnreadable).unwrap(),
            "\"E_EMPTY_OR_UNREADABLE\""
        );
        assert_eq!(
            serde_json::to_string(&ErrorCode::UnsupportedFormat).unwrap(),
            "\"E_UNSUPPORTED_FORMAT\""
        );
    }

    #[test]
    fn test_source_format_serialization() {
        assert_eq!(serde_json::to_string(&SourceFormat::Docx).unwrap(), "\"docx\"");
    }

    #[test]
    fn test_file_report_skips_empty_fields() {
        let report = FileReport::skipped("tiny.txt".into(), "File too short".into());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"], "File too short");
        assert!(json.get("output").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_process_folder_response_is_flat() {
        let resp = ProcessFolderResponse {
            status: Status::Success,
            message: None,
            input_folder: "data/input".into(),
            request_id: "r1".into(),
            report: BatchReport::from_results(vec![FileReport::error(
                "bad.pdf".into(),
                "No pages".into(),
                None,
            )]),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["failed"], 1);
        assert_eq!(json["processed"], 0);
        assert_eq!(json["results"][0]["file"], "bad.pdf");
        assert!(json.get("message").is_none());
    }

    #[test]
    fn test_settings_never_serialize_api_key() {
        let settings = AppSettings {
            api_key: Some("sk-secret".into()),
            ..AppSettings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("sk-secret"));
        assert!(json.contains("\"model\":\"gpt-4\""));
    }
}
