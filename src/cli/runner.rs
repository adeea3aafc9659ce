//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::pagination::CursorPosition;
use crate::token::Token;
use crate::types::{Method, Record};
use serde_json::{json, Value};
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let token = self.build_token()?;

        match &self.cli.command {
            Commands::Get { url, post } => self.get(&token, url, *post).await,
            Commands::Collection { url, post } => self.collection(&token, url, *post).await,
            Commands::Cursor {
                url,
                start_cursor,
                max_items,
                items_field,
            } => {
                self.cursor(&token, url, *start_cursor, *max_items, items_field)
                    .await
            }
            Commands::Timeline { url } => self.timeline(&token, url).await,
            Commands::Lookup { url, ids, names } => self.lookup(&token, url, ids, names).await,
            Commands::RateLimit { url } => self.rate_limit(&token, url).await,
        }
    }

    /// Load configuration and build the token
    fn build_token(&self) -> Result<Token> {
        let config = match &self.cli.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        }
        .with_env_overrides();
        config.require_credentials()?;

        let token = Token::from_config(&config)?;
        if self.cli.keep_going {
            Ok(token.with_exception_handler(|err| warn!("Request failed: {}", err)))
        } else {
            Ok(token)
        }
    }

    async fn get(&self, token: &Token, url: &str, post: bool) -> Result<()> {
        let mut print = |record: &Record| self.output_record(record);
        if post {
            token.execute_post(url, Some(&mut print), None).await?;
        } else {
            token.execute_get(url, Some(&mut print), None).await?;
        }
        Ok(())
    }

    async fn collection(&self, token: &Token, url: &str, post: bool) -> Result<()> {
        let method = if post { Method::POST } else { Method::GET };
        let mut print = |record: &Record| self.output_record(record);
        let records = if post {
            token
                .execute_post_collection(url, Some(&mut print), None)
                .await?
        } else {
            token
                .execute_get_collection(url, Some(&mut print), None)
                .await?
        };
        info!("{} {} returned {} records", method, url, records.len());
        Ok(())
    }

    async fn cursor(
        &self,
        token: &Token,
        url: &str,
        start_cursor: Option<i64>,
        max_items: Option<usize>,
        items_field: &str,
    ) -> Result<()> {
        let mut on_page = |page: &Record, _: CursorPosition| {
            self.output_record(page);
            page.get(items_field)
                .and_then(Value::as_array)
                .map_or(0, Vec::len)
        };
        let position = token
            .execute_cursor_query(url, start_cursor, max_items, Some(&mut on_page), None)
            .await?;
        info!(
            "Cursor query stopped at previous={} next={}",
            position.previous, position.next
        );
        Ok(())
    }

    async fn timeline(&self, token: &Token, url: &str) -> Result<()> {
        let mut print = |record: &Record| self.output_record(record);
        let state = token
            .execute_since_max_query(url, Some(&mut print), None)
            .await?;
        info!(
            "Timeline walk finished: {} items in {} passes",
            state.total_items, state.passes
        );
        Ok(())
    }

    async fn lookup(&self, token: &Token, url: &str, ids: &[i64], names: &[String]) -> Result<()> {
        let mut print = |record: &Record| self.output_record(record);
        token
            .lookup(url, ids, names, Some(&mut print), None)
            .await?;
        Ok(())
    }

    async fn rate_limit(&self, token: &Token, url: &str) -> Result<()> {
        let state = token.refresh_rate_limit(url).await?;
        self.output_message(&json!({
            "limit": state.limit,
            "remaining": state.remaining,
            "reset": state.reset.map(|t| t.to_rfc3339()),
        }));
        Ok(())
    }

    fn output_record(&self, record: &Record) {
        println!("{}", self.render(record));
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        println!("{}", self.render(msg));
    }

    fn render<T: serde::Serialize>(&self, value: &T) -> String {
        match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value).unwrap_or_default(),
            OutputFormat::Pretty => serde_json::to_string_pretty(value).unwrap_or_default(),
        }
    }
}
