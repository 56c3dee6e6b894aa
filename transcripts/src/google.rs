//! Wiring for the Google-backed session.
//!
//! Binaries must install a rustls crypto provider before calling [`connect`].

use std::sync::Arc;

use google_calendar3::yup_oauth2::{self, ApplicationSecret, InstalledFlowAuthenticator, InstalledFlowReturnMethod};
use google_calendar3::CalendarHub;
use google_drive3::DriveHub;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::calendar::google::{GoogleCalendar, CALENDAR_SCOPE};
use crate::config::{GoogleConfig, TranscriptsConfig};
use crate::drive::google::{GoogleDrive, DRIVE_SCOPE};
use crate::error::{RemoteError, Result, TranscriptError};
use crate::session::Session;

const AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

async fn application_secret(config: &GoogleConfig) -> Result<ApplicationSecret> {
    if let Some(path) = &config.credentials_path {
        return yup_oauth2::read_application_secret(path).await.map_err(|e| {
            TranscriptError::Config(format!(
                "failed to read OAuth credentials from {}: {}",
                path.display(),
                e
            ))
        });
    }

    match (&config.client_id, &config.client_secret) {
        (Some(client_id), Some(client_secret)) => Ok(ApplicationSecret {
            client_id: client_id.clone(),
            client_secret: client_secret.clone(),
            auth_uri: AUTH_URI.to_string(),
            token_uri: TOKEN_URI.to_string(),
            redirect_uris: vec![format!("http://localhost:{}", config.redirect_port)],
            ..Default::default()
        }),
        _ => Err(TranscriptError::Config(
            "set google.credentials_path or GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET".to_string(),
        )),
    }
}

/// Authorize once and build a session over the calendar and drive APIs.
///
/// The first run opens the installed-app consent flow; the token is then cached
/// at `google.token_cache_path`.
pub async fn connect(config: &TranscriptsConfig) -> Result<Session> {
    let secret = application_secret(&config.google).await?;

    let auth = InstalledFlowAuthenticator::builder(
        secret,
        InstalledFlowReturnMethod::HTTPPortRedirect(config.google.redirect_port),
    )
    .persist_tokens_to_disk(&config.google.token_cache_path)
    .build()
    .await?;

    // One consent for both scopes; the hubs then reuse the cached token.
    auth.token(&[CALENDAR_SCOPE, DRIVE_SCOPE])
        .await
        .map_err(|e| RemoteError::permanent("authorize", e.to_string()))?;

    let connector = google_calendar3::hyper_rustls::HttpsConnectorBuilder::new()
        .with_native_roots()?
        .https_or_http()
        .enable_http1()
        .build();
    let client = Client::builder(TokioExecutor::new()).build(connector);

    let calendar = GoogleCalendar::new(
        CalendarHub::new(client.clone(), auth.clone()),
        config.google.calendar_id.clone(),
        config.calendar.page_size,
    );
    let drive = GoogleDrive::new(DriveHub::new(client, auth), config.locator.page_size);

    tracing::info!("Connected to Google Calendar and Drive");
    Ok(Session::new(Arc::new(calendar), Arc::new(drive)))
}
