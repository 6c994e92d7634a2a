use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::Utc;

use crate::error::ServiceError;
use crate::schemas::{ExpenseUpdate, MemberUpdate, NewExpense, NewMember, NewTrip, TripUpdate};
use crate::service::TripService;

type Service = web::Data<TripService>;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ServiceError::validation(err.to_string()).into()
    }))
    .service(health)
    .service(list_trips)
    .service(create_trip)
    .service(get_trip)
    .service(update_trip)
    .service(delete_trip)
    .service(add_member)
    .service(update_member)
    .service(remove_member)
    .service(list_expenses)
    .service(add_expense)
    .service(update_expense)
    .service(delete_expense)
    .service(get_balances)
    .service(get_settlements)
    .service(get_summary);
}

#[get("/health")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

#[get("/trips")]
async fn list_trips(service: Service) -> Result<HttpResponse, ServiceError> {
    Ok(HttpResponse::Ok().json(service.list_trips().await?))
}

#[post("/trips")]
async fn create_trip(
    service: Service,
    json: web::Json<NewTrip>,
) -> Result<HttpResponse, ServiceError> {
    let trip = service.create_trip(json.into_inner()).await?;
    Ok(HttpResponse::Created().json(trip))
}

#[get("/trips/{id}")]
async fn get_trip(service: Service, id: web::Path<String>) -> Result<HttpResponse, ServiceError> {
    Ok(HttpResponse::Ok().json(service.trip(&id).await?))
}

#[patch("/trips/{id}")]
async fn update_trip(
    service: Service,
    id: web::Path<String>,
    json: web::Json<TripUpdate>,
) -> Result<HttpResponse, ServiceError> {
    let trip = service.update_trip(&id, json.into_inner()).await?;
    Ok(HttpResponse::Ok().json(trip))
}

#[delete("/trips/{id}")]
async fn delete_trip(
    service: Service,
    id: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    service.delete_trip(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[post("/trips/{id}/members")]
async fn add_member(
    service: Service,
    id: web::Path<String>,
    json: web::Json<NewMember>,
) -> Result<HttpResponse, ServiceError> {
    let member = service.add_member(&id, json.into_inner()).await?;
    Ok(HttpResponse::Created().json(member))
}

#[patch("/trips/{id}/members/{member_id}")]
async fn update_member(
    service: Service,
    path: web::Path<(String, String)>,
    json: web::Json<MemberUpdate>,
) -> Result<HttpResponse, ServiceError> {
    let (trip_id, member_id) = path.into_inner();
    let member = service
        .update_member(&trip_id, &member_id, json.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(member))
}

#[delete("/trips/{id}/members/{member_id}")]
async fn remove_member(
    service: Service,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let (trip_id, member_id) = path.into_inner();
    service.remove_member(&trip_id, &member_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/trips/{id}/expenses")]
async fn list_expenses(
    service: Service,
    id: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    Ok(HttpResponse::Ok().json(service.list_expenses(&id).await?))
}

#[post("/trips/{id}/expenses")]
async fn add_expense(
    service: Service,
    id: web::Path<String>,
    json: web::Json<NewExpense>,
) -> Result<HttpResponse, ServiceError> {
    let expense = service.add_expense(&id, json.into_inner()).await?;
    Ok(HttpResponse::Created().json(expense))
}

#[patch("/expenses/{id}")]
async fn update_expense(
    service: Service,
    id: web::Path<String>,
    json: web::Json<ExpenseUpdate>,
) -> Result<HttpResponse, ServiceError> {
    let expense = service.update_expense(&id, json.into_inner()).await?;
    Ok(HttpResponse::Ok().json(expense))
}

#[delete("/expenses/{id}")]
async fn delete_expense(
    service: Service,
    id: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    service.delete_expense(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/trips/{id}/balances")]
async fn get_balances(
    service: Service,
    id: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    Ok(HttpResponse::Ok().json(service.balances(&id).await?))
}

#[get("/trips/{id}/settlements")]
async fn get_settlements(
    service: Service,
    id: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    Ok(HttpResponse::Ok().json(service.settlements(&id).await?))
}

#[get("/trips/{id}/summary")]
async fn get_summary(
    service: Service,
    id: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    Ok(HttpResponse::Ok().json(service.summary(&id, Utc::now()).await?))
}
