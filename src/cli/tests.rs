#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use crate::config::LLMProvider;
    use crate::i18n::TargetLanguage;
    use clap::Parser;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["maven-rs"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    /// 写一个空配置文件，避免读取当前目录下的 maven.toml
    fn empty_config(dir: &TempDir) -> String {
        let path = dir.path().join("maven.toml");
        fs::write(&path, "").unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_query_is_required() {
        assert!(Args::try_parse_from(["maven-rs"]).is_err());
    }

    #[test]
    fn test_query_words_joined() {
        let args = args(&["noise", "cancelling", "headphones"]);
        assert_eq!(args.query(), "noise cancelling headphones");
        assert!(!args.verbose);
        assert!(!args.skip_images);
    }

    #[test]
    fn test_args_short_options() {
        let args = args(&[
            "-c", "/tmp/maven.toml",
            "-o", "/tmp/out.json",
            "-m", "/tmp/report.md",
            "-v",
            "e-reader",
        ]);

        assert_eq!(args.config, Some(PathBuf::from("/tmp/maven.toml")));
        assert_eq!(args.output, Some(PathBuf::from("/tmp/out.json")));
        assert_eq!(args.markdown, Some(PathBuf::from("/tmp/report.md")));
        assert!(args.verbose);
    }

    #[test]
    fn test_into_config_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = empty_config(&temp_dir);

        let config = args(&[
            "--config", &config_path,
            "--llm-provider", "openai",
            "--llm-api-key", "sk-test",
            "--model-efficient", "gpt-4o-mini",
            "--model-powerful", "gpt-4o",
            "--max-tokens", "2048",
            "--temperature", "0.5",
            "--search-api-key", "tvly-test",
            "--max-products", "5",
            "--max-price-checks", "1",
            "--skip-images",
            "--skip-planning",
            "--target-language", "zh",
            "--output", "result.json",
            "laptop",
        ])
        .into_config()
        .unwrap();

        assert_eq!(config.llm.provider, LLMProvider::OpenAI);
        assert_eq!(config.llm.api_key, "sk-test");
        assert_eq!(config.llm.model_efficient, "gpt-4o-mini");
        assert_eq!(config.llm.model_powerful, "gpt-4o");
        assert_eq!(config.llm.max_tokens, 2048);
        assert_eq!(config.llm.temperature, 0.5);
        assert_eq!(config.search.api_key, "tvly-test");
        assert_eq!(config.pipeline.max_products, 5);
        assert_eq!(config.pipeline.max_price_checks, 1);
        assert!(!config.pipeline.enable_image_search);
        assert!(!config.pipeline.plan_research);
        assert!(config.pipeline.enable_price_comparison);
        assert_eq!(config.target_language, TargetLanguage::Chinese);
        assert_eq!(config.output.json_path, Some(PathBuf::from("result.json")));
        assert!(config.output.markdown_path.is_none());
    }

    #[test]
    fn test_into_config_keeps_file_values() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("custom.toml");
        fs::write(
            &config_path,
            "verbose = true\n[pipeline]\nmax_products = 4\nenable_price_comparison = false\n",
        )
        .unwrap();

        let config = args(&[
            "--config",
            config_path.to_str().unwrap(),
            "--llm-provider",
            "not-a-provider",
            "tablet",
        ])
        .into_config()
        .unwrap();

        assert_eq!(config.pipeline.max_products, 4);
        assert!(!config.pipeline.enable_price_comparison);
        assert_eq!(config.llm.provider, LLMProvider::Gemini);
        assert!(config.verbose);
    }

    #[test]
    fn test_into_config_missing_file_is_error() {
        let result = args(&["--config", "/nonexistent/maven.toml", "tablet"]).into_config();
        assert!(result.is_err());
    }

    #[test]
    fn test_provider_flag_without_base_url() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = empty_config(&temp_dir);

        let config = args(&["--config", &config_path, "--llm-provider", "deepseek", "laptop"])
            .into_config()
            .unwrap();

        assert_eq!(config.llm.provider, LLMProvider::DeepSeek);
        assert!(config.llm.api_base_url.is_empty());
    }
}
