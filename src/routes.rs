use crate::{
    api::{attendance, dashboard, profile, report},
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
                    // /attendance
                    .service(
                        web::resource("")
                            .route(web::post().to(attendance::check_in))
                            .route(web::put().to(attendance::check_out))
                            .route(web::get().to(attendance::today)),
                    )
                    // /attendance/history
                    .service(
                        web::resource("/history").route(web::get().to(attendance::history)),
                    )
                    // /attendance/summary
                    .service(
                        web::resource("/summary").route(web::get().to(attendance::month_summary)),
                    ),
            )
            .service(
                web::scope("/profiles")
                    // /profiles/me
                    .service(
                        web::resource("/me")
                            .route(web::get().to(profile::my_profile))
                            .route(web::put().to(profile::update_my_profile)),
                    )
                    // /profiles
                    .service(web::resource("").route(web::get().to(profile::list_profiles)))
                    // /profiles/{id}
                    .service(web::resource("/{id}").route(web::get().to(profile::get_profile))),
            )
            .service(
                web::scope("/dashboard")
                    // /dashboard/today
                    .service(
                        web::resource("/today").route(web::get().to(dashboard::today_overview)),
                    ),
            )
            .service(
                web::scope("/reports")
                    // /reports
                    .service(web::resource("").route(web::get().to(report::attendance_report)))
                    // /reports/export
                    .service(web::resource("/export").route(web::get().to(report::export_csv))),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /refresh with refresh_token
//       └─ returns new access_token
