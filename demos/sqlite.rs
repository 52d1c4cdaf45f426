//! A login flow with persistent sessions in SQLite: sessions survive server
//! restarts, and expired rows are pruned on a schedule. Run with
//! `cargo run --example sqlite --features sqlx_sqlite`.

use std::{sync::Arc, time::Duration};

use rocket::{http::Status, routes, serde::json::Json};
use rocket_sessions::{store::sqlite::SqliteStore, Session, SessionManager};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePoolOptions;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct AppSession {
    user: Option<User>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct User {
    id: u32,
    name: String,
}

#[rocket::launch]
async fn rocket() -> _ {
    // Open (or create) the database and prepare the session table
    let pool = SqlitePoolOptions::new()
        .connect("sqlite://sessions.db?mode=rwc")
        .await
        .expect("Failed to open database");
    let store = Arc::new(SqliteStore::builder().pool(pool).build());
    store
        .migrate()
        .await
        .expect("Failed to migrate session table");

    // Prune expired session rows once an hour
    let cleanup_store = store.clone();
    rocket::tokio::spawn(async move {
        let mut interval = rocket::tokio::time::interval(Duration::from_secs(60 * 60));
        loop {
            interval.tick().await;
            if let Err(e) = cleanup_store.cleanup().await {
                rocket::error!("Session cleanup failed: {e}");
            }
        }
    });

    rocket::build()
        .attach(SessionManager::<AppSession>::builder().store(store).build())
        .mount("/", routes![login, logout, user])
}

#[derive(Deserialize)]
struct LoginData {
    username: String,
    password: String,
}

#[rocket::post("/login", data = "<data>")]
async fn login(
    mut session: Session<'_, AppSession>,
    data: Json<LoginData>,
) -> Result<&'static str, (Status, &'static str)> {
    if session.with(|data| data.user.is_some()) {
        return Err((Status::BadRequest, "Already logged in"));
    }

    // Implement actual login logic here
    if data.username == "rossg" && data.password == "dinosaurs" {
        session.with_mut(|data| {
            data.user = Some(User {
                id: 1,
                name: "Ross".to_string(),
            });
        });
        Ok("Logged in")
    } else {
        Err((Status::Unauthorized, "Invalid credentials"))
    }
}

#[rocket::get("/user")]
async fn user(session: Session<'_, AppSession>) -> Result<String, (Status, &'static str)> {
    match session.with(|data| data.user.clone()) {
        Some(user) => Ok(format!("User: {} (id {})", user.name, user.id)),
        None => Err((Status::Unauthorized, "Not logged in")),
    }
}

#[rocket::post("/logout")]
async fn logout(mut session: Session<'_, AppSession>) -> &'static str {
    session.set(AppSession::default());
    "Logged out"
}
