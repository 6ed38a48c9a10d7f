use crate::{
    api::{attendance, device, employee, geofence},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("/check-in").route(web::post().to(attendance::check_in)),
                    )
                    .service(
                        web::resource("/check-out").route(web::put().to(attendance::check_out)),
                    )
                    .service(web::resource("/today").route(web::get().to(attendance::today))),
            )
            .service(
                web::scope("/devices")
                    // /devices
                    .service(web::resource("").route(web::post().to(device::register_device)))
                    .service(
                        web::resource("/pending")
                            .route(web::get().to(device::pending_registrations)),
                    )
                    .service(web::resource("/status").route(web::get().to(device::device_status)))
                    // /devices/{reg_id}/approve
                    .service(
                        web::resource("/{reg_id}/approve")
                            .route(web::put().to(device::approve_device)),
                    )
                    .service(
                        web::resource("/{reg_id}/reject")
                            .route(web::put().to(device::reject_device)),
                    ),
            )
            .service(
                web::scope("/geofence").service(
                    web::resource("")
                        .route(web::get().to(geofence::get_geofence))
                        .route(web::put().to(geofence::update_geofence)),
                ),
            )
            .service(
                web::scope("/employees")
                    .service(web::resource("").route(web::get().to(employee::list_employees)))
                    .service(web::resource("/{id}").route(web::get().to(employee::get_employee))),
            ),
    );
}
