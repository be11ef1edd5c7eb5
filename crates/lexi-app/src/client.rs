use kanal::AsyncSender;
use lexi_types::{
    AckResponse, Command, ListResponse, PageResponse, Response, Settings, TranslateResponse,
    VocabEntry,
};
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::events::Request;

/// Sending side of the command surface, shared by the page loop, the list view and the transport
#[derive(Clone)]
pub struct BackendClient {
    tx: AsyncSender<Request>,
}

impl BackendClient {
    pub fn new(tx: AsyncSender<Request>) -> Self {
        Self { tx }
    }

    pub async fn send(&self, command: Command) -> anyhow::Result<Response> {
        let (reply, response) = oneshot::channel();
        let id = Uuid::new_v4();
        tracing::debug!("[CLIENT] {} {}", id, command.name());

        self.tx.send(Request { id, command, reply }).await?;
        Ok(response.await?)
    }

    pub async fn translate_word(
        &self,
        word: impl Into<String>,
        paragraph: impl Into<String>,
        source_url: impl Into<String>,
    ) -> anyhow::Result<TranslateResponse> {
        let command = Command::TranslateWord {
            word: word.into(),
            paragraph: paragraph.into(),
            source_url: source_url.into(),
        };
        match self.send(command).await? {
            Response::Translate(response) => Ok(response),
            other => anyhow::bail!("Unexpected reply to TRANSLATE_WORD: {other:?}"),
        }
    }

    pub async fn scan_page(&self) -> anyhow::Result<Vec<VocabEntry>> {
        match self.send(Command::ScanPage).await? {
            Response::Entries(list) => Ok(list),
            other => anyhow::bail!("Unexpected reply to SCAN_PAGE: {other:?}"),
        }
    }

    pub async fn delete_word(&self, word: impl Into<String>) -> anyhow::Result<ListResponse> {
        let command = Command::DeleteWord { word: word.into() };
        self.expect_list(command).await
    }

    pub async fn update_word(
        &self,
        word: impl Into<String>,
        translation: impl Into<String>,
    ) -> anyhow::Result<ListResponse> {
        let command = Command::UpdateWord {
            word: word.into(),
            translation: translation.into(),
        };
        self.expect_list(command).await
    }

    pub async fn trigger_scan(&self) -> anyhow::Result<AckResponse> {
        self.expect_ack(Command::TriggerScan).await
    }

    pub async fn remove_highlight(&self, word: impl Into<String>) -> anyhow::Result<AckResponse> {
        let command = Command::RemoveHighlight { word: word.into() };
        self.expect_ack(command).await
    }

    pub async fn attach_page(
        &self,
        html: impl Into<String>,
        source_url: impl Into<String>,
    ) -> anyhow::Result<AckResponse> {
        let command = Command::AttachPage {
            html: html.into(),
            source_url: source_url.into(),
        };
        self.expect_ack(command).await
    }

    pub async fn get_page(&self) -> anyhow::Result<PageResponse> {
        match self.send(Command::GetPage).await? {
            Response::Page(response) => Ok(response),
            other => anyhow::bail!("Unexpected reply to GET_PAGE: {other:?}"),
        }
    }

    pub async fn get_settings(&self) -> anyhow::Result<Settings> {
        match self.send(Command::GetSettings).await? {
            Response::Settings(settings) => Ok(settings),
            Response::Ack(AckResponse {
                error: Some(error), ..
            }) => anyhow::bail!("Loading settings failed: {error}"),
            other => anyhow::bail!("Unexpected reply to GET_SETTINGS: {other:?}"),
        }
    }

    pub async fn save_settings(&self, settings: Settings) -> anyhow::Result<AckResponse> {
        let command = Command::SaveSettings {
            api_key: settings.api_key,
            model: settings.model,
        };
        self.expect_ack(command).await
    }

    async fn expect_list(&self, command: Command) -> anyhow::Result<ListResponse> {
        let name = command.name();
        match self.send(command).await? {
            Response::List(response) => Ok(response),
            other => anyhow::bail!("Unexpected reply to {name}: {other:?}"),
        }
    }

    async fn expect_ack(&self, command: Command) -> anyhow::Result<AckResponse> {
        let name = command.name();
        match self.send(command).await? {
            Response::Ack(response) => Ok(response),
            other => anyhow::bail!("Unexpected reply to {name}: {other:?}"),
        }
    }
}
