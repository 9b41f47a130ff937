// src/handlers/exam.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use rand::{SeedableRng, rngs::StdRng};
use validator::Validate;

use crate::{
    error::AppError,
    exam::{
        ExamSession, SessionError, SessionStatus, format_remaining,
        palette::palette,
        randomizer::randomize,
        store::SessionHandle,
        submission::enforce_deadline,
    },
    models::{
        exam_record::{
            ActionResponse, ExamView, GoToRequest, InstructionsResponse, PaletteQuery,
            PaletteResponse, SelectAnswerRequest, SubmissionResult,
        },
        question::{PublicQuestion, Section},
    },
    state::AppState,
    utils::jwt::Claims,
};

/// Looks up the caller's session.
///
/// 404 until the exam has been started, 409 once the attempt has been
/// submitted or abandoned.
pub(crate) async fn load_session(
    state: &AppState,
    claims: &Claims,
) -> Result<SessionHandle, AppError> {
    if let Some(handle) = state.sessions.get(&claims.sub, Utc::now()).await {
        return Ok(handle);
    }

    match state.sessions.closed(&claims.sub).await {
        Some(SessionStatus::Submitted) => Err(SessionError::AlreadySubmitted.into()),
        Some(_) => Err(AppError::Conflict(
            "Exam time is over and the attempt has been closed".to_string(),
        )),
        None => Err(AppError::NotFound("Exam has not been started".to_string())),
    }
}

/// Once a session is submitted only its terminal marker stays in the store.
pub(crate) async fn retire_if_submitted(state: &AppState, claims: &Claims, session: &ExamSession) {
    if session.status() == SessionStatus::Submitted {
        state.sessions.retire(&claims.sub).await;
    }
}

/// Everything the exam screen shows for the current question.
fn exam_view(session: &ExamSession, auto_submission: Option<SubmissionResult>) -> ExamView {
    let current = session.current();
    let remaining_secs = session.remaining_secs(Utc::now());

    ExamView {
        status: session.status(),
        name: session.candidate().name.clone(),
        app_no: session.candidate().app_no.clone(),
        position: session.position(),
        question_count: session.questions().len(),
        question: PublicQuestion::from(current),
        selected: session.answer(current.id()),
        marked: session.is_marked(current.id()),
        remaining_secs,
        remaining: format_remaining(remaining_secs),
        unanswered: session.unanswered_count(),
        marked_count: session.marked_count(),
        auto_submission,
    }
}

/// Runs the timer check and then `action`.
///
/// If the timer fires on this request, the exam is submitted automatically and
/// the submission result is returned instead of performing `action`.
async fn act<F>(state: &AppState, claims: &Claims, action: F) -> Result<ActionResponse, AppError>
where
    F: FnOnce(&mut ExamSession) -> Result<(), SessionError>,
{
    let handle = load_session(state, claims).await?;
    let mut session = handle.lock().await;

    if let Some(result) =
        enforce_deadline(&mut session, state.exam_service.as_ref(), Utc::now()).await?
    {
        retire_if_submitted(state, claims, &session).await;
        return Ok(ActionResponse {
            status: session.status(),
            position: session.position(),
            auto_submission: Some(result),
        });
    }

    action(&mut *session)?;

    Ok(ActionResponse {
        status: session.status(),
        position: session.position(),
        auto_submission: None,
    })
}

/// Static exam rules shown before the candidate starts.
pub async fn instructions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    let minutes = state.config.exam_duration_secs / 60;

    Json(InstructionsResponse {
        name: claims.name,
        app_no: claims.sub,
        sections: Section::ALL.to_vec(),
        duration_secs: state.config.exam_duration_secs,
        rules: vec![
            "3 Sections: Physics, Chemistry, Maths".to_string(),
            format!("Timer enabled: {} minutes, submitted automatically when it runs out", minutes),
            "Mark for Review available".to_string(),
            "The exam can be submitted only once".to_string(),
        ],
    })
}

/// Starts the exam: fetches the bank once, shuffles it and opens the session.
///
/// Starting again returns the existing attempt unchanged; it is never reshuffled.
pub async fn start_exam(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    match load_session(&state, &claims).await {
        Ok(handle) => {
            let session = handle.lock().await;
            if session.status() == SessionStatus::Submitted {
                return Err(SessionError::AlreadySubmitted.into());
            }
            return Ok((StatusCode::OK, Json(exam_view(&session, None))));
        }
        Err(AppError::NotFound(_)) => {}
        Err(e) => return Err(e),
    }

    let bank = state.exam_service.fetch_questions().await.map_err(|e| {
        tracing::error!(app_no = %claims.sub, error = %e, "Failed to fetch question bank");
        AppError::from(e)
    })?;

    let seed = state.config.shuffle_seed.unwrap_or_else(rand::random::<u64>);
    let mut rng = StdRng::seed_from_u64(seed);
    let questions = randomize(&bank, &mut rng)?;

    let session = ExamSession::start(
        claims.candidate(),
        questions,
        Utc::now(),
        state.config.exam_duration_secs,
    )?;

    let (handle, created) = state
        .sessions
        .insert_if_absent(&claims.sub, session, Utc::now())
        .await;
    let session = handle.lock().await;

    if created {
        tracing::info!(
            app_no = %claims.sub,
            questions = session.questions().len(),
            "Exam started"
        );
        Ok((StatusCode::CREATED, Json(exam_view(&session, None))))
    } else {
        Ok((StatusCode::OK, Json(exam_view(&session, None))))
    }
}

/// Current question, timer and counters.
pub async fn current(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let handle = load_session(&state, &claims).await?;
    let mut session = handle.lock().await;

    let auto_submission =
        enforce_deadline(&mut session, state.exam_service.as_ref(), Utc::now()).await?;
    retire_if_submitted(&state, &claims, &session).await;

    Ok(Json(exam_view(&session, auto_submission)))
}

/// Question palette, optionally restricted to one section (`?section=Physics`).
pub async fn get_palette(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PaletteQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = Section::parse_filter(query.section.as_deref()).map_err(AppError::BadRequest)?;

    let handle = load_session(&state, &claims).await?;
    let mut session = handle.lock().await;

    let auto_submission =
        enforce_deadline(&mut session, state.exam_service.as_ref(), Utc::now()).await?;
    match (&auto_submission, session.status()) {
        (Some(_), _) => retire_if_submitted(&state, &claims, &session).await,
        (None, SessionStatus::Submitted) => return Err(SessionError::AlreadySubmitted.into()),
        (None, _) => session.filter_by_section(filter),
    }

    Ok(Json(PaletteResponse {
        section: session.section_filter(),
        entries: palette(&session),
        unanswered: session.unanswered_count(),
        marked: session.marked_count(),
        auto_submission,
    }))
}

pub async fn select_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(question_id): Path<String>,
    Json(payload): Json<SelectAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let response = act(&state, &claims, |session| {
        session.select_answer(&question_id, payload.option)
    })
    .await?;

    Ok(Json(response))
}

pub async fn clear_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(question_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let response = act(&state, &claims, |session| session.clear_answer(&question_id)).await?;
    Ok(Json(response))
}

pub async fn toggle_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(question_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let response = act(&state, &claims, |session| {
        session.toggle_review(&question_id).map(|_| ())
    })
    .await?;
    Ok(Json(response))
}

pub async fn go_to(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<GoToRequest>,
) -> Result<impl IntoResponse, AppError> {
    // Checked here so a bad index from the client is a 400, not a session fault.
    let handle = load_session(&state, &claims).await?;
    let count = handle.lock().await.questions().len();
    if payload.index >= count {
        return Err(AppError::BadRequest(format!(
            "Question index must be below {}",
            count
        )));
    }

    let response = act(&state, &claims, |session| session.go_to(payload.index)).await?;
    Ok(Json(response))
}

pub async fn next(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let response = act(&state, &claims, |session| session.next().map(|_| ())).await?;
    Ok(Json(response))
}

pub async fn previous(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let response = act(&state, &claims, |session| session.previous().map(|_| ())).await?;
    Ok(Json(response))
}
