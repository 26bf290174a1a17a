use crate::config::{parse_categories, RunConfig};
use crate::core::ParameterSource;
use crate::domain::model::WriteMode;
use crate::utils::error::{EtlError, Result};
use std::io::{BufRead, Write};

const SEARCH_DOCS: &str = "https://docs.developer.yelp.com/reference/v3_business_search";
const CATEGORY_DOCS: &str = "https://docs.developer.yelp.com/docs/resources-categories";

/// Asks for each run parameter on a console. An empty answer keeps the default.
pub struct PromptSource<R, W> {
    reader: R,
    writer: W,
    defaults: RunConfig,
}

impl PromptSource<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio(defaults: RunConfig) -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout(), defaults)
    }
}

impl<R: BufRead, W: Write> PromptSource<R, W> {
    pub fn new(reader: R, writer: W, defaults: RunConfig) -> Self {
        Self {
            reader,
            writer,
            defaults,
        }
    }

    fn ask(&mut self, question: &str, default: &str) -> Result<String> {
        write!(self.writer, "{} [{}]: ", question, default)?;
        self.writer.flush()?;

        let mut answer = String::new();
        self.reader.read_line(&mut answer)?;
        Ok(answer.trim().to_string())
    }
}

impl<R: BufRead, W: Write> ParameterSource for PromptSource<R, W> {
    fn collect(&mut self) -> Result<RunConfig> {
        let mut config = self.defaults.clone();

        writeln!(self.writer, "\nSearch parameters are described at {}\n", SEARCH_DOCS)?;
        let location = self.ask(
            "Location to search, e.g. NY, TX, NJ",
            &self.defaults.location.clone(),
        )?;
        if !location.is_empty() {
            config.location = location;
        }

        writeln!(self.writer, "\nCategory aliases are listed at {}\n", CATEGORY_DOCS)?;
        let categories = self.ask(
            "Extra categories, comma separated, e.g. kebab,sushi,bbq",
            &self.defaults.extra_categories.join(","),
        )?;
        if !categories.is_empty() {
            config.extra_categories = parse_categories(&categories);
        }

        let limit = self.ask("How many restaurants (maximum 50)", &self.defaults.limit.to_string())?;
        if !limit.is_empty() {
            config.limit = limit
                .parse()
                .map_err(|_| EtlError::InvalidConfigValueError {
                    field: "limit".to_string(),
                    value: limit.clone(),
                    reason: "Expected a whole number".to_string(),
                })?;
        }

        let output = self.ask("CSV file to write", &self.defaults.output_path.clone())?;
        if !output.is_empty() {
            config.output_path = output;
        }

        let mode = self.ask(
            "Write mode: w to overwrite, a to append",
            self.defaults.write_mode.as_flag(),
        )?;
        if !mode.is_empty() {
            config.write_mode = WriteMode::from_flag(&mode);
        }

        Ok(config)
    }
}
