#![allow(clippy::unwrap_used)]

use std::fs;

use sitemapper_core::{
    DEFAULT_COLLECTION, RobotsAction, Route, SitemapConfig, generate, sitemap_reference,
    update_robots_txt, write_output,
};
use tempfile::TempDir;

#[cfg(test)]
mod output_files {
    use super::*;

    #[tokio::test]
    async fn test_config_to_files_end_to_end() {
        // Given: A config file that forces a split and points at a temp output dir
        let tmp = TempDir::new().unwrap();
        let out_dir = tmp.path().join("public");
        let config_path = tmp.path().join("sitemap.toml");
        fs::write(
            &config_path,
            format!(
                "hostname = \"https://example.com\"\nexclude = [\"/private/**\"]\n\n[split]\nmax_urls = 2\n\n[output]\ndir = {:?}\n",
                out_dir.display().to_string()
            ),
        )
        .unwrap();

        let config = SitemapConfig::load(&config_path).unwrap();
        let dir = config.output.dir.clone();
        let options = config.into_options().unwrap();
        let routes = vec![
            Route::new("/"),
            Route::new("/a"),
            Route::new("/private/keys"),
            Route::new("/b"),
        ];

        // When: Generating, writing and advertising the result
        let result = generate(DEFAULT_COLLECTION, routes, &options).await.unwrap();
        let written = write_output(&result, &dir).unwrap();
        let reference = sitemap_reference(&result, "https://example.com").unwrap();
        let robots = update_robots_txt(&dir, &reference).unwrap();

        // Then: Two chunks plus the index are on disk and robots.txt points at the index
        assert_eq!(result.excluded_count, 1);
        assert_eq!(written.len(), 3);
        assert!(dir.join("sitemap-0.xml").exists());
        assert!(dir.join("sitemap-1.xml").exists());
        assert!(dir.join("sitemap-index.xml").exists());
        assert_eq!(reference, "https://example.com/sitemap-index.xml");
        assert_eq!(robots.action, RobotsAction::Created);
        let robots_txt = fs::read_to_string(dir.join("robots.txt")).unwrap();
        assert!(robots_txt.contains("Sitemap: https://example.com/sitemap-index.xml"));
    }

    #[tokio::test]
    async fn test_second_collection_appends_to_robots() {
        let tmp = TempDir::new().unwrap();
        let options = SitemapConfig::from_toml_str("hostname = \"https://example.com\"")
            .unwrap()
            .into_options()
            .unwrap();

        for name in [DEFAULT_COLLECTION, "blog"] {
            let result = generate(name, vec![Route::new("/")], &options).await.unwrap();
            write_output(&result, tmp.path()).unwrap();
            let reference = sitemap_reference(&result, "https://example.com").unwrap();
            update_robots_txt(tmp.path(), &reference).unwrap();
        }
        let again = update_robots_txt(tmp.path(), "https://example.com/sitemap-blog.xml").unwrap();

        let robots_txt = fs::read_to_string(tmp.path().join("robots.txt")).unwrap();
        assert_eq!(robots_txt.matches("Sitemap:").count(), 2);
        assert!(robots_txt.contains("Sitemap: https://example.com/sitemap.xml\n"));
        assert!(robots_txt.ends_with("Sitemap: https://example.com/sitemap-blog.xml\n"));
        assert_eq!(again.action, RobotsAction::Unchanged);
    }
}
