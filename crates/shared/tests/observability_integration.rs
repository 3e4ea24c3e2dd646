//! 可观测性模块集成测试
//!
//! 指标记录在未安装 recorder 时为空操作，这里只验证调用路径不会 panic。

mod metrics_tests {
    use learning_shared::observability::metrics::{
        record_badge_award, record_http_request, record_topic_completion,
    };

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/api/progress", 200, 0.01);
        record_http_request("POST", "/api/topics/{id}/complete", 201, 0.05);
        record_http_request("POST", "/api/topics/{id}/complete", 503, 1.2);
    }

    #[test]
    fn test_record_topic_completion() {
        record_topic_completion("completed", 0.02);
        record_topic_completion("already_completed", 0.01);
        record_topic_completion("error", 0.3);
    }

    #[test]
    fn test_record_badge_award() {
        record_badge_award("topic_completion");
        record_badge_award("reevaluation");
    }
}

mod config_tests {
    use learning_shared::config::AppConfig;
    use learning_shared::observability::ObservabilityConfig;

    #[test]
    fn test_observability_defaults() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.service_name, "unknown-service");
        assert!(config.otlp_endpoint.is_none());
        assert!(config.metrics_enabled);
    }

    #[test]
    fn test_app_config_embeds_observability() {
        let config = AppConfig::default();
        let obs = config.observability.with_service_name("learning-api");
        assert_eq!(obs.service_name, "learning-api");
        assert_eq!(obs.metrics_port, 9090);
    }
}
