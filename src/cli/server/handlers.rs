use std::path::{Path as FsPath, PathBuf};
use std::str::FromStr;

use axum::{
    body::{Body, Bytes},
    extract::{
        multipart::MultipartError, rejection::JsonRejection, FromRequest, Multipart, Path,
        Request, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::application::ports::{ArtifactDownloader, GenerationApiProvider};
use crate::application::JobSubmission;
use crate::domain::config::{AppConfig, ServiceCredentials};
use crate::domain::content::{ContentFileFormat, ContentHints, MAX_CONTENT_FILE_SIZE};
use crate::domain::error::{ContentError, InvalidOptionError};
use crate::domain::generation::{
    parse_speaker_names, GenerationDraft, ScriptOptions, VoiceOptions,
};
use crate::domain::job::Job;

use super::error::{AppError, AppResult};
use super::ServerState;

/// Content selection for a new job; one of the fields is expected
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContentRequest {
    pub url: Option<String>,
    pub temp_file_id: Option<String>,
    /// Bare file name inside the input directory
    pub input_file: Option<String>,
}

/// Body of `POST /api/jobs`. Blank strings count as absent.
///
/// The multipart form variant carries the same fields flat, plus a `file`
/// part that replaces `content`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct JobRequest {
    pub region: Option<String>,
    pub subscription_key: Option<String>,
    pub api_version: Option<String>,
    pub locale: Option<String>,
    pub content: ContentRequest,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub host: Option<String>,
    pub length: Option<String>,
    pub style: Option<String>,
    pub additional_instructions: Option<String>,
    pub voice_name: Option<String>,
    pub gender_preference: Option<String>,
    pub multi_talker_voice_speaker_names: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobCreated {
    pub job_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InputFiles {
    pub files: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CancelResponse {
    pub job_id: Uuid,
    pub phase: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub job_id: Uuid,
    pub deleted: bool,
}

/// Job snapshot as returned by the API
#[derive(Debug, Serialize, Deserialize)]
pub struct JobView {
    pub job_id: Uuid,
    pub phase: String,
    pub error: Option<String>,
    pub has_audio: bool,
    pub locale: String,
    pub content: String,
    pub audio_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Job> for JobView {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id(),
            phase: job.phase().to_string(),
            error: job.error(),
            has_audio: job.artifact_path().is_some(),
            locale: job.locale().to_string(),
            content: job.content_kind().to_string(),
            audio_url: job.audio_url().map(str::to_string),
            created_at: job.created_at(),
            updated_at: job.updated_at(),
        }
    }
}

/// GET /api/input-files - `.txt`/`.pdf` files offered for jobs
pub async fn list_input_files<P, D>(
    State(state): State<ServerState<P, D>>,
) -> AppResult<Json<InputFiles>> {
    let dir = state.config.input_dir_or_default();
    let mut files = Vec::new();

    let mut entries = match tokio::fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Json(InputFiles { files }));
        }
        Err(e) => return Err(AppError::Internal(e.to_string())),
    };

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    {
        let is_file = entry.file_type().await.is_ok_and(|t| t.is_file());
        let path = entry.path();
        let supported = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ContentFileFormat::from_extension)
            .is_some();
        if let (true, true, Some(name)) = (is_file, supported, entry.file_name().to_str()) {
            files.push(name.to_string());
        }
    }

    files.sort();
    Ok(Json(InputFiles { files }))
}

/// POST /api/jobs - validate and start a job
///
/// JSON bodies select existing content; `multipart/form-data` bodies upload
/// a `.txt`/`.pdf` file into the input directory first.
pub async fn submit_job<P, D>(
    State(state): State<ServerState<P, D>>,
    request: Request,
) -> AppResult<(StatusCode, Json<JobCreated>)>
where
    P: GenerationApiProvider + 'static,
    D: ArtifactDownloader + 'static,
{
    let is_form = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    if is_form {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        return submit_upload(state, multipart).await;
    }

    let Json(request) = Json::<JobRequest>::from_request(request, &state)
        .await
        .map_err(json_rejection)?;
    let credentials = credentials_for(&state.config, &request)?;
    let hints = hints_for(&state.config.input_dir_or_default(), &request.content).await?;
    let draft = draft_for(&request)?;

    start_job(&state, credentials, draft, hints).await
}

/// Request body cap for job submission: the largest content file plus form overhead
pub(super) const SUBMIT_BODY_LIMIT: usize = MAX_CONTENT_FILE_SIZE as usize + 1024 * 1024;

/// A `file` part of an upload form
struct UploadedFile {
    file_name: String,
    bytes: Bytes,
}

async fn submit_upload<P, D>(
    state: ServerState<P, D>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<JobCreated>)>
where
    P: GenerationApiProvider + 'static,
    D: ArtifactDownloader + 'static,
{
    let (request, upload) = read_upload_form(multipart).await?;
    let upload = upload
        .filter(|u| !u.file_name.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Please select a file to upload".to_string()))?;

    let credentials = credentials_for(&state.config, &request)?;
    let draft = draft_for(&request)?;

    let extension = upload_extension(&upload.file_name)?;
    let actual = upload.bytes.len() as u64;
    if actual > MAX_CONTENT_FILE_SIZE {
        return Err(ContentError::SizeLimitExceeded {
            subject: "Uploaded file",
            actual,
            limit: MAX_CONTENT_FILE_SIZE,
        }
        .into());
    }

    let input_dir = state.config.input_dir_or_default();
    tokio::fs::create_dir_all(&input_dir)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let saved_name = format!("upload_{}.{}", &Uuid::new_v4().simple().to_string()[..8], extension);
    let saved_path = input_dir.join(&saved_name);
    tokio::fs::write(&saved_path, &upload.bytes)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    tracing::info!(
        original = %upload.file_name,
        saved = %saved_name,
        bytes = actual,
        "upload stored"
    );

    let content = ContentRequest {
        input_file: Some(saved_name),
        ..Default::default()
    };
    let submitted = match hints_for(&input_dir, &content).await {
        Ok(hints) => start_job(&state, credentials, draft, hints).await,
        Err(e) => Err(e),
    };
    if submitted.is_err() {
        if let Err(e) = tokio::fs::remove_file(&saved_path).await {
            tracing::warn!(path = %saved_path.display(), error = %e, "failed to remove rejected upload");
        }
    }
    submitted
}

/// Split an upload form into job fields and the `file` part
async fn read_upload_form(
    mut multipart: Multipart,
) -> AppResult<(JobRequest, Option<UploadedFile>)> {
    let mut request = JobRequest::default();
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(multipart_error)?;
            upload = Some(UploadedFile { file_name, bytes });
            continue;
        }

        let slot = match name.as_str() {
            "region" => &mut request.region,
            "subscription_key" => &mut request.subscription_key,
            "api_version" => &mut request.api_version,
            "locale" => &mut request.locale,
            "display_name" => &mut request.display_name,
            "description" => &mut request.description,
            "host" => &mut request.host,
            "length" => &mut request.length,
            "style" => &mut request.style,
            "additional_instructions" => &mut request.additional_instructions,
            "voice_name" => &mut request.voice_name,
            "gender_preference" => &mut request.gender_preference,
            "multi_talker_voice_speaker_names" => &mut request.multi_talker_voice_speaker_names,
            _ => {
                tracing::debug!(field = %name, "ignoring form field");
                continue;
            }
        };
        *slot = Some(field.text().await.map_err(multipart_error)?);
    }

    Ok((request, upload))
}

/// Lowercase extension of an uploaded file name, if it is `.txt` or `.pdf`
fn upload_extension(file_name: &str) -> AppResult<String> {
    let extension = FsPath::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match ContentFileFormat::from_extension(&extension) {
        Some(_) => Ok(extension),
        None => Err(ContentError::UnsupportedFormat {
            extension: if extension.is_empty() {
                "(none)".to_string()
            } else {
                format!(".{}", extension)
            },
        }
        .into()),
    }
}

fn multipart_error(err: MultipartError) -> AppError {
    match err.status() {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(err.body_text()),
        _ => AppError::BadRequest(err.body_text()),
    }
}

fn json_rejection(err: JsonRejection) -> AppError {
    match err.status() {
        StatusCode::UNSUPPORTED_MEDIA_TYPE => AppError::UnsupportedMediaType(err.body_text()),
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(err.body_text()),
        _ => AppError::BadRequest(err.body_text()),
    }
}

async fn start_job<P, D>(
    state: &ServerState<P, D>,
    credentials: ServiceCredentials,
    draft: GenerationDraft,
    hints: ContentHints,
) -> AppResult<(StatusCode, Json<JobCreated>)>
where
    P: GenerationApiProvider + 'static,
    D: ArtifactDownloader + 'static,
{
    let job_id = state
        .orchestrator
        .submit(JobSubmission {
            credentials,
            draft,
            hints,
        })
        .await?;

    Ok((StatusCode::ACCEPTED, Json(JobCreated { job_id })))
}

/// GET /api/jobs - all jobs, oldest first
pub async fn list_jobs<P, D>(State(state): State<ServerState<P, D>>) -> Json<Vec<JobView>>
where
    P: GenerationApiProvider + 'static,
    D: ArtifactDownloader + 'static,
{
    Json(state.orchestrator.list().iter().map(JobView::from).collect())
}

/// GET /api/jobs/:id
pub async fn job_status<P, D>(
    State(state): State<ServerState<P, D>>,
    Path(id): Path<String>,
) -> AppResult<Json<JobView>>
where
    P: GenerationApiProvider + 'static,
    D: ArtifactDownloader + 'static,
{
    let id = parse_job_id(&id)?;
    let job = state.orchestrator.status(id).ok_or_else(|| job_not_found(id))?;
    Ok(Json(JobView::from(&job)))
}

/// POST /api/jobs/:id/cancel
pub async fn cancel_job<P, D>(
    State(state): State<ServerState<P, D>>,
    Path(id): Path<String>,
) -> AppResult<Json<CancelResponse>>
where
    P: GenerationApiProvider + 'static,
    D: ArtifactDownloader + 'static,
{
    let id = parse_job_id(&id)?;
    let phase = state.orchestrator.cancel(id).ok_or_else(|| job_not_found(id))?;
    Ok(Json(CancelResponse {
        job_id: id,
        phase: phase.to_string(),
    }))
}

/// GET /api/jobs/:id/audio - downloaded artifact as an attachment
pub async fn download_audio<P, D>(
    State(state): State<ServerState<P, D>>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse>
where
    P: GenerationApiProvider + 'static,
    D: ArtifactDownloader + 'static,
{
    let id = parse_job_id(&id)?;
    let path = state.orchestrator.artifact(id)?;
    let file = tokio::fs::File::open(&path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AppError::NotFound(format!("Audio for job {} is gone", id)),
        _ => AppError::Internal(e.to_string()),
    })?;
    let length = file
        .metadata()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .len();

    Ok((
        [
            (header::CONTENT_TYPE, "audio/mpeg".to_string()),
            (header::CONTENT_LENGTH, length.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}.mp3\"", id),
            ),
        ],
        Body::from_stream(ReaderStream::new(file)),
    ))
}

/// DELETE /api/jobs/:id/generation - delete the remote generation
pub async fn delete_generation<P, D>(
    State(state): State<ServerState<P, D>>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteResponse>>
where
    P: GenerationApiProvider + 'static,
    D: ArtifactDownloader + 'static,
{
    let id = parse_job_id(&id)?;
    state.orchestrator.delete_remote(id).await?;
    Ok(Json(DeleteResponse {
        job_id: id,
        deleted: true,
    }))
}

fn parse_job_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("Job not found: {}", raw)))
}

fn job_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Job not found: {}", id))
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_option<T>(value: &Option<String>) -> Result<Option<T>, InvalidOptionError>
where
    T: FromStr<Err = InvalidOptionError>,
{
    non_blank(value).map(|v| v.parse()).transpose()
}

/// Request credentials over the server's configured ones
fn credentials_for(config: &AppConfig, request: &JobRequest) -> AppResult<ServiceCredentials> {
    let overrides = AppConfig {
        region: non_blank(&request.region),
        subscription_key: non_blank(&request.subscription_key),
        api_version: non_blank(&request.api_version),
        ..Default::default()
    };
    Ok(ServiceCredentials::from_config(&config.clone().merge(overrides))?)
}

fn draft_for(request: &JobRequest) -> AppResult<GenerationDraft> {
    Ok(GenerationDraft {
        display_name: non_blank(&request.display_name),
        description: non_blank(&request.description),
        locale: non_blank(&request.locale),
        host: parse_option(&request.host)?,
        script: ScriptOptions {
            additional_instructions: non_blank(&request.additional_instructions),
            length: parse_option(&request.length)?,
            style: parse_option(&request.style)?,
        },
        voice: VoiceOptions {
            voice_name: non_blank(&request.voice_name),
            gender_preference: parse_option(&request.gender_preference)?,
            multi_talker_speaker_names: request
                .multi_talker_voice_speaker_names
                .as_deref()
                .map(parse_speaker_names)
                .unwrap_or_default(),
        },
    })
}

async fn hints_for(input_dir: &FsPath, content: &ContentRequest) -> AppResult<ContentHints> {
    let file_path = match non_blank(&content.input_file) {
        Some(name) => Some(input_file_path(input_dir, &name).await?),
        None => None,
    };

    Ok(ContentHints {
        remote_url: non_blank(&content.url),
        temp_file_id: non_blank(&content.temp_file_id),
        file_path,
        base64_file_path: None,
    })
}

/// Resolve a bare file name inside `input_dir`
async fn input_file_path(input_dir: &FsPath, name: &str) -> AppResult<PathBuf> {
    if !is_bare_file_name(name) {
        return Err(AppError::BadRequest(format!(
            "Input file must be a plain file name: {}",
            name
        )));
    }

    let path = input_dir.join(name);
    match tokio::fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => Ok(path),
        _ => Err(AppError::NotFound(format!("Input file not found: {}", name))),
    }
}

fn is_bare_file_name(name: &str) -> bool {
    let mut components = FsPath::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(std::path::Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}
