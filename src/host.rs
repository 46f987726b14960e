use std::io::{self, Read, Write};

use anyhow::Context;
use gemini_api::{
    CountTokensRequest, GeminiApiConfig, GeminiApiError, GeminiClient, GenerateContentRequest,
};
use tokio::runtime::{Builder, Runtime};

use crate::app::ChatHost;

/// Terminal host: replies on stdout, notices on stderr, `/paste` from stdin.
pub struct GeminiHost {
    client: GeminiClient,
    runtime: Runtime,
}

impl GeminiHost {
    pub fn new(config: GeminiApiConfig) -> anyhow::Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start the async runtime")?;
        let client = GeminiClient::new(config).context("failed to build the HTTP client")?;
        Ok(Self { client, runtime })
    }
}

impl ChatHost for GeminiHost {
    fn generate(
        &mut self,
        model: &str,
        request: &GenerateContentRequest,
        streaming: bool,
    ) -> Result<String, GeminiApiError> {
        let client = &self.client;
        if !streaming {
            return self.runtime.block_on(client.generate(model, request));
        }

        let mut stdout = io::stdout();
        self.runtime.block_on(client.stream_generate(model, request, |fragment| {
            let _ = stdout.write_all(fragment.as_bytes());
            let _ = stdout.flush();
        }))
    }

    fn count_tokens(
        &mut self,
        model: &str,
        request: &CountTokensRequest,
    ) -> Result<u64, GeminiApiError> {
        self.runtime.block_on(self.client.count_tokens(model, request))
    }

    fn emit(&mut self, text: &str) {
        let mut stdout = io::stdout();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }

    fn notice(&mut self, line: &str) {
        eprintln!("{line}");
    }

    fn paste_source(&mut self) -> Box<dyn Read + '_> {
        Box::new(io::stdin().lock())
    }
}
