use super::AppContext;
use crate::error::AppError;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::AUTHORIZATION;
use actix_web::middleware::Next;
use actix_web::web;

/// Paths behind the bearer token. Public files stay reachable without it.
fn is_protected(path: &str) -> bool {
    path.starts_with("/api/") || path == "/api" || path.starts_with("/files/private/")
}

/// Rejects protected requests without the configured bearer token. A no-op when
/// no token is configured.
pub async fn require_token(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let expected = req
        .app_data::<web::Data<AppContext>>()
        .and_then(|ctx| ctx.config.api_token.clone());

    if let Some(expected) = expected.filter(|_| is_protected(req.path())) {
        let presented = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim);
        if presented != Some(expected.as_str()) {
            return Err(AppError::Unauthorized.into());
        }
    }
    next.call(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_api_and_private_files_are_protected() {
        assert!(is_protected("/api/categories"));
        assert!(is_protected("/files/private/abc.pdf"));
        assert!(!is_protected("/files/public/abc.pdf"));
        assert!(!is_protected("/apiary"));
    }
}
