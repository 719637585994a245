use crate::cli::FlowArg;
use crate::infra::{read_submission, DemoTokens};
use clap::Args;
use onboarding::config::AppConfig;
use onboarding::error::AppError;
use onboarding::workflows::onboarding::{
    merge_submission, validate_submission, AccessGuard, FlowKind, MemoryStore, NewUser,
    OnboardingError, OnboardingService, Request, Submission, UserProfile,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

const DEMO_ADMIN_ROLE: i64 = 3;

type DemoService = OnboardingService<MemoryStore>;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Onboarding path for the demo applicant.
    #[arg(long, value_enum, default_value_t)]
    pub(crate) flow: FlowArg,
    /// Reject the request instead of approving it.
    #[arg(long)]
    pub(crate) reject: bool,
    /// Rejection note to attach (repeatable). Only used with --reject.
    #[arg(long)]
    pub(crate) notes: Vec<String>,
    /// Override the applicant's mobile number to see validation in action.
    #[arg(long)]
    pub(crate) mobile: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Onboarding path the submission is intended for.
    #[arg(long, value_enum, default_value_t)]
    pub(crate) flow: FlowArg,
    /// JSON file holding one submission.
    pub(crate) path: PathBuf,
}

/// Run engine calls off the async runtime; the store serializes on a mutex.
async fn blocking<T, F>(call: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, OnboardingError> + Send + 'static,
    T: Send + 'static,
{
    let outcome = tokio::task::spawn_blocking(call)
        .await
        .map_err(std::io::Error::other)?;
    Ok(outcome?)
}

pub(crate) async fn run_demo(config: &AppConfig, args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        flow,
        reject,
        notes,
        mobile,
    } = args;
    let flow = FlowKind::from(flow);

    let store = Arc::new(MemoryStore::new());
    let service = Arc::new(DemoService::new(store, config.onboarding.policy));
    let tokens = DemoTokens::default();
    let signing_key = config.auth.signing_key.clone();

    println!("Onboarding lifecycle demo");

    let admin = register(&service, "admin@example.org", "Lan", "Tran").await?;
    let applicant = register(&service, "applicant@example.org", "Hoa", "Le").await?;
    println!(
        "Registered admin #{} and applicant #{} ({})",
        admin.id, applicant.id, applicant.email
    );

    let mut submission = Submission {
        user_id: applicant.id,
        department_id: Some(2),
        gender: Some("female".to_string()),
        dob: "1996-09-14".to_string(),
        mobile: Some("0987654321".to_string()),
        country_id: Some(84),
        resident_country_id: Some(84),
    };
    if let Some(mobile) = mobile {
        submission.mobile = Some(mobile);
    }

    let request = match submit(&service, flow, submission.clone(), config).await {
        Ok(request) => request,
        Err(AppError::Workflow(err)) => {
            println!("Submission refused: {err}");
            return Ok(());
        }
        Err(other) => return Err(other),
    };
    render_request("Submitted", &request);

    if let Err(AppError::Workflow(err)) = submit(&service, flow, submission, config).await {
        println!("Second submission refused: {err}");
    }

    let token = tokens
        .issue(
            &signing_key,
            json!({ "userId": admin.id.0, "roleId": DEMO_ADMIN_ROLE }),
        )
        .map_err(OnboardingError::from)?;
    let guard = AccessGuard::new(signing_key, tokens);

    if let Err(err) = guard.authorize(None) {
        println!("Anonymous review attempt: {err}");
    }
    let principal = guard
        .authorize(Some(&format!("Bearer {token}")))
        .map_err(OnboardingError::from)?;
    info!(admin_id = principal.user_id().0, "demo admin authorized");

    let pending = {
        let service = service.clone();
        blocking(move || service.list_pending_requests(&principal)).await?
    };
    println!("\nPending queue ({} request(s))", pending.len());
    for request in &pending {
        println!(
            "  - #{} {} for user {}",
            request.id,
            request.request_type.label(),
            request.user_id
        );
    }

    let ctx = config.onboarding.request_context();
    let reviewed = {
        let service = service.clone();
        let id = request.id;
        blocking(move || {
            if !reject {
                return service.approve_request(&principal, id, &ctx);
            }
            let mut reviewed = service.reject_request(&principal, id, &ctx)?;
            for note in &notes {
                reviewed = service.add_rejection_notes(&principal, id, note, &ctx)?;
            }
            Ok(reviewed)
        })
        .await?
    };
    render_request("Reviewed", &reviewed);

    let profile = {
        let service = service.clone();
        let user_id = applicant.id;
        blocking(move || service.get_profile(user_id)).await?
    };
    println!(
        "\nApplicant profile: role {:?}, gender {}, dob {}, mobile {}",
        profile.role_id.map(|role| role.0),
        profile.gender.map(|g| g.label()).unwrap_or("-"),
        profile
            .dob
            .map(|dob| dob.format("%d %b %Y").to_string())
            .unwrap_or_else(|| "-".to_string()),
        profile.mobile.as_deref().unwrap_or("-"),
    );

    Ok(())
}

pub(crate) fn run_check(config: &AppConfig, args: CheckArgs) -> Result<(), AppError> {
    let submission = read_submission(&args.path)?;
    let merged = validate_submission(submission)
        .and_then(|validated| {
            merge_submission(
                validated,
                FlowKind::from(args.flow),
                &config.onboarding.policy.roles,
            )
        })
        .map_err(OnboardingError::from)?;

    println!("{}", serde_json::to_string_pretty(&merged)?);
    Ok(())
}

async fn register(
    service: &Arc<DemoService>,
    email: &str,
    name: &str,
    surname: &str,
) -> Result<UserProfile, AppError> {
    let service = service.clone();
    let user = NewUser {
        email: email.to_string(),
        name: name.to_string(),
        surname: surname.to_string(),
    };
    blocking(move || service.register_user(user)).await
}

async fn submit(
    service: &Arc<DemoService>,
    flow: FlowKind,
    submission: Submission,
    config: &AppConfig,
) -> Result<Request, AppError> {
    let service = service.clone();
    let ctx = config.onboarding.request_context();
    blocking(move || service.create_request(flow, submission, &ctx)).await
}

fn render_request(heading: &str, request: &Request) {
    println!(
        "\n{heading} request #{} ({})",
        request.id,
        request.request_type.label()
    );
    println!("  status   : {}", request.status);
    println!(
        "  verifier : {}",
        request
            .verifier_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    if let Some(notes) = &request.reject_notes {
        for line in notes.lines() {
            println!("  note     : {line}");
        }
    }
}
