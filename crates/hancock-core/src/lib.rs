pub mod config;
pub mod language;
pub mod scan;
pub mod scraper;

pub use config::{Config, ConfigError, OutputFormat};
pub use language::{
    compile, javascript, CompiledLanguage, GrammarError, LanguageDefinition, LanguageError,
    LanguageRegistry,
};
pub use scan::{scrape_directory, scrape_file, FileReport, ScanError, Scanner};
pub use scraper::{DeclarationSummary, Forest, NodeDirectory, Scraper};
