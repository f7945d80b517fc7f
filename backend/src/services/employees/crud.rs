use crate::error::AppError;
use crate::services::validate::{self, optional_text, required_text};
use crate::services::AppContext;
use crate::store::{kinds, EntityStoreExt, StoreError};
use actix_web::{web, HttpResponse};
use common::model::employee::Employee;
use common::requests::EmployeeInput;
use log::info;

pub(super) async fn list(ctx: web::Data<AppContext>) -> Result<HttpResponse, AppError> {
    let mut employees: Vec<Employee> = ctx.store.list_as(kinds::EMPLOYEE, None)?;
    employees.sort_by(|a, b| a.full_name.cmp(&b.full_name).then_with(|| a.id.cmp(&b.id)));
    Ok(HttpResponse::Ok().json(employees))
}

pub(super) async fn get(
    ctx: web::Data<AppContext>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let employee: Employee = ctx.store.get_as(kinds::EMPLOYEE, &id)?;
    Ok(HttpResponse::Ok().json(employee))
}

pub(super) async fn create(
    ctx: web::Data<AppContext>,
    payload: web::Json<EmployeeInput>,
) -> Result<HttpResponse, AppError> {
    let mut input = payload.into_inner();
    input.full_name = Some(required_text(input.full_name.as_deref(), "full_name")?);
    let email = required_text(input.email.as_deref(), "email")?;
    validate::email(&email)?;
    input.email = Some(email);
    check_manager(&ctx, None, input.manager_id.as_deref())?;

    let employee: Employee = ctx.store.create_from(kinds::EMPLOYEE, &input)?;
    info!("created employee {} ({})", employee.id, employee.full_name);
    Ok(HttpResponse::Created().json(employee))
}

pub(super) async fn update(
    ctx: web::Data<AppContext>,
    id: web::Path<String>,
    payload: web::Json<EmployeeInput>,
) -> Result<HttpResponse, AppError> {
    let mut input = payload.into_inner();
    input.full_name = optional_text(input.full_name.as_deref(), "full_name")?;
    input.email = optional_text(input.email.as_deref(), "email")?;
    if let Some(email) = &input.email {
        validate::email(email)?;
    }
    check_manager(&ctx, Some(id.as_str()), input.manager_id.as_deref())?;

    let employee: Employee = ctx.store.update_from(kinds::EMPLOYEE, &id, &input)?;
    Ok(HttpResponse::Ok().json(employee))
}

pub(super) async fn remove(
    ctx: web::Data<AppContext>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    ctx.store.delete(kinds::EMPLOYEE, &id)?;
    info!("deleted employee {}", id);
    Ok(HttpResponse::NoContent().finish())
}

/// A manager must be another existing employee.
fn check_manager(
    ctx: &AppContext,
    employee_id: Option<&str>,
    manager_id: Option<&str>,
) -> Result<(), AppError> {
    let Some(manager_id) = manager_id else {
        return Ok(());
    };
    if employee_id == Some(manager_id) {
        return Err(AppError::validation("an employee cannot manage themselves"));
    }
    match ctx.store.get(kinds::EMPLOYEE, manager_id) {
        Ok(_) => Ok(()),
        Err(StoreError::NotFound { .. }) => Err(AppError::validation(format!(
            "manager {} does not exist",
            manager_id
        ))),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use crate::services::employees::configure_routes;
    use crate::services::testing;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use common::model::employee::Employee;
    use serde_json::json;

    #[actix_web::test]
    async fn create_validates_name_email_and_manager() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _store) = testing::context(dir.path());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx))
                .service(configure_routes()),
        )
        .await;

        for body in [
            json!({ "email": "ana@example.com" }),
            json!({ "full_name": "Ana", "email": "ana" }),
            json!({ "full_name": "Ana", "email": "ana@example.com", "manager_id": "ghost" }),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/employees")
                .set_json(body)
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
        }

        let req = test::TestRequest::post()
            .uri("/api/employees")
            .set_json(json!({ "full_name": "Ana Perez", "email": "ana@example.com" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let ana: Employee = test::read_body_json(resp).await;
        assert!(ana.is_active);

        let req = test::TestRequest::put()
            .uri(&format!("/api/employees/{}", ana.id))
            .set_json(json!({ "manager_id": ana.id }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/employees")
            .set_json(json!({
                "full_name": "Bruno Diaz",
                "email": "bruno@example.com",
                "manager_id": ana.id,
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::get().uri("/api/employees").to_request();
        let listed: Vec<Employee> = test::call_and_read_body_json(&app, req).await;
        let names: Vec<&str> = listed.iter().map(|e| e.full_name.as_str()).collect();
        assert_eq!(names, ["Ana Perez", "Bruno Diaz"]);
    }
}
