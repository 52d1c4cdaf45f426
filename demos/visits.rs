//! A minimal visit counter using the default in-memory store. Run with
//! `cargo run --example visits`, then open <http://localhost:8000> and
//! refresh a few times.

use rocket::{routes, time::Duration};
use rocket_sessions::{Session, SessionManager};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Visits {
    count: u32,
}

#[rocket::get("/")]
fn index(mut session: Session<Visits>) -> String {
    let count = session.with_mut(|visits| {
        visits.count += 1;
        visits.count
    });
    format!("You have visited this site {count} time(s)\n")
}

#[rocket::post("/reset")]
fn reset(mut session: Session<Visits>) -> &'static str {
    session.set(Visits::default());
    "Counter reset\n"
}

#[rocket::launch]
fn rocket() -> _ {
    // Build the session fairing, passing in the session data type as the
    // generic parameter
    let session_fairing = SessionManager::<Visits>::builder()
        .with_options(|opt| {
            // keep counters for a day
            opt.ttl = Duration::hours(24);
            // more options available:
            // opt.cookie_name = "visits".to_string();
            // opt.secure = true; // when serving over HTTPS
            // etc...
        })
        .build();

    rocket::build()
        .attach(session_fairing)
        .mount("/", routes![index, reset])
}
