//! # Stored File Service
//!
//! - `GET /files/public/{name}`: files uploaded without access control.
//! - `GET /files/private/{name}`: private uploads; the auth middleware requires
//!   the API token on this path.
//!
//! `name` is the content-addressed file name written by the file store.

use crate::error::{method_not_allowed, AppError};
use crate::services::AppContext;
use crate::store::files::Visibility;
use actix_files::NamedFile;
use actix_web::web::{get, resource, scope, to};
use actix_web::{web, Scope};

const FILES_PATH: &str = "/files";

pub fn configure_routes() -> Scope {
    scope(FILES_PATH)
        .service(
            resource("/public/{name}")
                .route(get().to(public_file))
                .default_service(to(method_not_allowed)),
        )
        .service(
            resource("/private/{name}")
                .route(get().to(private_file))
                .default_service(to(method_not_allowed)),
        )
}

async fn public_file(
    ctx: web::Data<AppContext>,
    name: web::Path<String>,
) -> Result<NamedFile, AppError> {
    open(&ctx, Visibility::Public, &name).await
}

async fn private_file(
    ctx: web::Data<AppContext>,
    name: web::Path<String>,
) -> Result<NamedFile, AppError> {
    open(&ctx, Visibility::Private, &name).await
}

async fn open(ctx: &AppContext, visibility: Visibility, name: &str) -> Result<NamedFile, AppError> {
    let not_found = || AppError::NotFound(format!("file {}", name));
    let path = ctx.files.resolve(visibility, name).ok_or_else(not_found)?;
    NamedFile::open_async(path).await.map_err(|_| not_found())
}

#[cfg(test)]
mod tests {
    use super::configure_routes;
    use crate::services::auth::require_token;
    use crate::services::testing;
    use crate::store::files::{FileStore, PRIVATE_SCHEME, PUBLIC_PREFIX};
    use actix_web::http::StatusCode;
    use actix_web::middleware::from_fn;
    use actix_web::{test, web, App};

    #[actix_web::test]
    async fn serves_public_files_and_guards_private_ones() {
        let dir = tempfile::tempdir().unwrap();
        let (mut ctx, _store) = testing::context(dir.path());
        ctx.config.api_token = Some("s3cret".to_string());
        let public = ctx
            .files
            .upload_file("scan.pdf".to_string(), b"%PDF public".to_vec())
            .await
            .unwrap();
        let private = ctx
            .files
            .upload_private_file("id.png".to_string(), b"private".to_vec())
            .await
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx))
                .wrap(from_fn(require_token))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::get().uri(&public.location).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await.as_ref(), b"%PDF public");

        let private_uri = format!(
            "/files/private/{}",
            private.location.trim_start_matches(PRIVATE_SCHEME)
        );
        let req = test::TestRequest::get().uri(&private_uri).to_request();
        let status = match test::try_call_service(&app, req).await {
            Ok(resp) => resp.status(),
            Err(err) => err.as_response_error().status_code(),
        };
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri(&private_uri)
            .insert_header(("Authorization", "Bearer s3cret"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri(&format!("{}missing.pdf", PUBLIC_PREFIX))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
