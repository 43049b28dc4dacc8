#[cfg(test)]
mod tests {
    use crate::config::{Config, LLMConfig, LLMProvider, PipelineConfig, SearchConfig};
    use crate::i18n::TargetLanguage;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.target_language, TargetLanguage::English);
        assert!(config.output.json_path.is_none());
        assert!(config.output.markdown_path.is_none());
        assert!(!config.verbose);
    }

    #[test]
    fn test_llm_provider_default() {
        let provider = LLMProvider::default();
        assert_eq!(provider, LLMProvider::Gemini);
    }

    #[test]
    fn test_llm_provider_from_str() {
        assert_eq!(
            "openai".parse::<LLMProvider>().unwrap(),
            LLMProvider::OpenAI
        );
        assert_eq!(
            "deepseek".parse::<LLMProvider>().unwrap(),
            LLMProvider::DeepSeek
        );
        assert_eq!(
            "Anthropic".parse::<LLMProvider>().unwrap(),
            LLMProvider::Anthropic
        );
        assert_eq!(
            "google".parse::<LLMProvider>().unwrap(),
            LLMProvider::Gemini
        );
        assert_eq!(
            "ollama".parse::<LLMProvider>().unwrap(),
            LLMProvider::Ollama
        );

        assert!("invalid".parse::<LLMProvider>().is_err());
    }

    #[test]
    fn test_llm_provider_display_round_trip() {
        for provider in [
            LLMProvider::OpenAI,
            LLMProvider::Moonshot,
            LLMProvider::DeepSeek,
            LLMProvider::Mistral,
            LLMProvider::OpenRouter,
            LLMProvider::Anthropic,
            LLMProvider::Gemini,
            LLMProvider::Ollama,
        ] {
            assert_eq!(provider.to_string().parse::<LLMProvider>(), Ok(provider));
        }
    }

    #[test]
    fn test_llm_config_default() {
        let config = LLMConfig::default();

        // api_key may be empty if env var is not set
        assert!(!config.model_efficient.is_empty());
        assert!(!config.model_powerful.is_empty());
        assert_eq!(config.max_tokens, 8192);
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_delay_ms, 2000);
        assert_eq!(config.timeout_seconds, 120);
    }

    #[test]
    fn test_search_config_default() {
        let config = SearchConfig::default();

        assert_eq!(config.base_url, "https://api.tavily.com");
        assert_eq!(config.max_results, 5);
        assert_eq!(config.search_depth, "basic");
    }

    #[test]
    fn test_pipeline_config_default_limits() {
        let config = PipelineConfig::default();

        assert_eq!(config.max_products, 3);
        assert_eq!(config.max_price_checks, 2);
        assert_eq!(config.max_images, 3);
        assert!(config.plan_research);
        assert!(config.enable_image_search);
        assert!(config.enable_price_comparison);
    }

    #[test]
    fn test_from_file_partial_sections() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("maven.toml");
        std::fs::write(
            &path,
            r#"target_language = "zh"

[llm]
provider = "openai"
model_efficient = "gpt-4o-mini"

[pipeline]
max_products = 5
enable_image_search = false

[output]
json_path = "out/result.json"
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();

        assert_eq!(config.target_language, TargetLanguage::Chinese);
        assert_eq!(config.llm.provider, LLMProvider::OpenAI);
        assert_eq!(config.llm.model_efficient, "gpt-4o-mini");
        // 未写出的字段使用默认值
        assert_eq!(config.llm.retry_attempts, 3);
        assert_eq!(config.pipeline.max_products, 5);
        assert_eq!(config.pipeline.max_price_checks, 2);
        assert!(!config.pipeline.enable_image_search);
        assert_eq!(
            config.output.json_path,
            Some(PathBuf::from("out/result.json"))
        );
    }

    #[test]
    fn test_from_file_missing() {
        let result = Config::from_file(&PathBuf::from("/nonexistent/maven.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.toml");
        std::fs::write(&path, "[pipeline\nmax_products = ").unwrap();

        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        std::fs::write(&path, "verbose = true\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert!(config.verbose);
    }

    #[test]
    fn test_switching_provider_keeps_default_endpoint() {
        let config: Config = toml::from_str("[llm]\nprovider = \"openai\"\n").unwrap();

        assert_eq!(config.llm.provider, LLMProvider::OpenAI);
        assert!(config.llm.api_base_url.is_empty());
        assert!(LLMConfig::default().api_base_url.is_empty());
    }
}
