use std::time::Duration;

use serde_json::json;
use tracing::warn;

use crate::directory::Directory;
use crate::model::leave_request::LeaveRequest;

/// Client for the external notification service. Delivery is fire-and-
/// forget: failures are logged and swallowed, and callers dispatch sends
/// on a detached task after the state transition has committed.
#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    base_url: String,
}

impl Notifier {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build notifier HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn send_email(&self, to: &str, subject: &str, body: &str) {
        let url = format!("{}/notify/email", self.base_url);
        let payload = json!({"to": to, "subject": subject, "body": body});
        match self.client.post(&url).json(&payload).send().await {
            Ok(resp) if !resp.status().is_success() => {
                warn!(to, status = %resp.status(), "notification rejected");
            }
            Ok(_) => {}
            Err(e) => warn!(to, error = %e, "notification failed"),
        }
    }
}

/// Mail to the fixed manager recipient announcing a new PENDING request.
pub fn creation_email(request: &LeaveRequest, requester_email: &str) -> (String, String) {
    let name = request.employee_name.as_deref().unwrap_or("");
    let subject = format!("New Leave from {} (#{})", name, request.id);
    let body = format!(
        "Leave Request Created\n\
         ----------------------\n\
         Request ID : {}\n\
         Employee   : {} (user_id={}, email={})\n\
         Type       : {}\n\
         Dates      : {} -> {}\n\
         Reason     : {}\n\
         Status     : {}\n",
        request.id,
        name,
        request.user_id,
        if requester_email.is_empty() {
            "-"
        } else {
            requester_email
        },
        request.leave_type,
        request.start_date,
        request.end_date,
        request.reason.as_deref().unwrap_or("-"),
        request.status,
    );
    (subject, body)
}

/// Mail to the requester carrying the manager's decision and remark.
pub fn decision_email(request: &LeaveRequest) -> (String, String) {
    let decision = request.status.to_string();
    let subject = format!("Your Leave Request #{} was {}", request.id, decision);
    let mut body = format!(
        "Hi {},\n\nYour {} leave from {} to {} has been {}.",
        request.employee_name.as_deref().unwrap_or(""),
        request.leave_type,
        request.start_date,
        request.end_date,
        decision,
    );
    if let Some(remark) = request.decision_remark.as_deref().filter(|r| !r.is_empty()) {
        body.push_str(&format!("\n\nManager remark: {remark}"));
    }
    body.push_str("\n\nRegards,\nLeave Management System");
    (subject, body)
}

/// Resolves the requester's address and delivers the decision mail, fully
/// off the caller's critical path.
pub fn spawn_decision_email(notifier: Notifier, directory: Directory, request: LeaveRequest) {
    actix_web::rt::spawn(async move {
        let to = directory.email(request.user_id).await;
        if to.is_empty() {
            warn!(user_id = request.user_id, "no requester email, skipping decision mail");
            return;
        }
        let (subject, body) = decision_email(&request);
        notifier.send_email(&to, &subject, &body).await;
    });
}
