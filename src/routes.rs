use crate::api::{balance, leave_request};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, rate_per_min: u32) {
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

    let limiter = Arc::new(build_limiter(rate_per_min));

    // Fixed paths are registered before the {id} catch-alls.
    cfg.service(
        web::scope("/leaves")
            .wrap(limiter)
            .service(
                web::resource("")
                    .route(web::post().to(leave_request::create_leave)),
            )
            .service(web::resource("/mine").route(web::get().to(leave_request::my_leaves)))
            .service(web::resource("/pending").route(web::get().to(leave_request::pending_leaves)))
            .service(web::resource("/balance").route(web::get().to(balance::my_balance)))
            .service(web::resource("/balance/all").route(web::get().to(balance::balance_all)))
            .service(
                web::resource("/balance/{user_id}").route(web::get().to(balance::user_balance)),
            )
            .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
            .service(
                web::resource("/{id}/approve")
                    .route(web::post().to(leave_request::approve_leave)),
            )
            .service(
                web::resource("/{id}/reject").route(web::post().to(leave_request::reject_leave)),
            ),
    );
}
