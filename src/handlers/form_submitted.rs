use std::{
    io,
    pin::Pin,
    str::FromStr,
    task::{Context, Poll},
};

use axum::{
    Form,
    body::Body,
    extract::State,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tokio::{
    fs::File,
    io::{AsyncRead, ReadBuf},
};
use tokio_util::io::ReaderStream;

use crate::{
    converter::{MediaArtifact, Outcome},
    errors::ConvertError,
    handlers::page::{FormValues, Notice, render_page},
    media::OutputFormat,
    schema::AppState,
    utils::{content_disposition, is_supported_url},
    workspace::JobDir,
};

#[derive(Debug, Deserialize)]
pub struct ConvertForm {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub format: String,
}

pub async fn form_submitted(State(state): State<AppState>, Form(form): Form<ConvertForm>) -> Response {
    let values = FormValues {
        url: &form.url,
        format: OutputFormat::from_str(form.format.trim()).ok(),
    };

    if !is_supported_url(&form.url) {
        log::warn!("Rejected submission with URL {:?}", form.url);
        let notices = [Notice::error("Invalid URL. Please enter a proper YouTube link.")];
        return (StatusCode::BAD_REQUEST, render_page(&notices, &values)).into_response();
    }

    log::info!("Conversion requested: {} as {:?}", form.url.trim(), form.format);

    match state.converter.download(&form.url, &form.format).await {
        Outcome::Success(artifact) => match file_response(artifact).await {
            Ok(response) => response,
            Err(e) => {
                log::error!("Error serving file: {}", e);
                let notices = [Notice::error(format!("Error serving file: {}. Please try again.", e))];
                (StatusCode::INTERNAL_SERVER_ERROR, render_page(&notices, &values)).into_response()
            }
        },
        Outcome::Failure(e) => {
            let notices = [Notice::error(format!("Download failed: {}", e))];
            (status_for(&e), render_page(&notices, &values)).into_response()
        }
    }
}

fn status_for(error: &ConvertError) -> StatusCode {
    match error {
        ConvertError::InvalidUrl(_) | ConvertError::UnsupportedFormat(_) => StatusCode::BAD_REQUEST,
        ConvertError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ConvertError::Acquisition(_) => StatusCode::BAD_GATEWAY,
        ConvertError::MissingTranscoder(_)
        | ConvertError::ArtifactNotFound(_)
        | ConvertError::FileSystem(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Streams the artifact as an attachment. The body owns the job directory, so
/// the file is removed once the transfer ends or the client goes away.
async fn file_response(artifact: MediaArtifact) -> io::Result<Response> {
    let file = File::open(&artifact.path).await?;
    let length = file.metadata().await?.len();

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static(artifact.format.content_type()),
    );
    headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
    headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_str(&content_disposition(&artifact.filename))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
    );

    log::info!("Sending {} ({} bytes)", artifact.filename, length);

    let body = Body::from_stream(ReaderStream::new(ArtifactFile {
        file,
        _job: artifact.job,
    }));
    Ok((headers, body).into_response())
}

struct ArtifactFile {
    file: File,
    _job: JobDir,
}

impl AsyncRead for ArtifactFile {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.file).poll_read(cx, buf)
    }
}
