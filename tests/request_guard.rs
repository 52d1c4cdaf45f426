#[macro_use]
extern crate rocket;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use rocket::{
    http::{Cookie, Status},
    local::blocking::Client,
    outcome::try_outcome,
    request::{FromRequest, Outcome},
    serde::{Deserialize, Serialize},
    Build, Request, Rocket, State,
};
use rocket_sessions::{
    store::{memory::MemoryStore, mock::MockStore},
    Session, SessionManager,
};

#[derive(Clone, Debug, FromFormField, Serialize, Deserialize, PartialEq)]
enum UserRole {
    User,
    Admin,
}
impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            UserRole::User => write!(f, "user"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
struct User {
    role: UserRole,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
struct AppSession {
    user: Option<User>,
}

struct Auth {
    user: User,
}

struct Admin {
    user: User,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Auth {
    type Error = &'r str;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        // Run the Session request guard (succeeds whenever the session loaded)
        let session = match req.guard::<Session<AppSession>>().await {
            Outcome::Success(session) => session,
            _ => return Outcome::Error((Status::InternalServerError, "session unavailable")),
        };

        // Auth is a property of the session data, not of the guard
        match session.with(|data| data.user.clone()) {
            Some(user) => Outcome::Success(Auth { user }),
            None => Outcome::Error((Status::Unauthorized, "Not logged in")),
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Admin {
    type Error = &'r str;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        // Run the Auth request guard to ensure there's a user
        let auth = try_outcome!(req.guard::<Auth>().await);

        // Check user for admin role
        if auth.user.role == UserRole::Admin {
            Outcome::Success(Admin { user: auth.user })
        } else {
            Outcome::Forward(Status::Forbidden)
        }
    }
}

#[post("/login?<role>")]
fn login(role: UserRole, mut session: Session<AppSession>) -> &'static str {
    session.with_mut(|data| data.user = Some(User { role }));
    "Logged in"
}

#[post("/logout")]
fn logout(mut session: Session<AppSession>) -> &'static str {
    session.with_mut(|data| data.user = None);
    "Logged out"
}

#[get("/user")]
fn get_user(auth: Auth) -> String {
    format!("Logged in as {}", auth.user.role)
}

#[get("/admin")]
fn admin_only_route(admin: Admin) -> String {
    format!("Admin access granted to {:?}", admin.user)
}

#[get("/session_id")]
fn session_id(session: Session<AppSession>) -> String {
    session.id().unwrap_or_default()
}

#[post("/revoke/<sid>")]
async fn revoke(
    sid: &str,
    _admin: Admin,
    manager: &State<SessionManager<AppSession>>,
) -> &'static str {
    match manager.delete(sid).await {
        Ok(()) => "Session revoked",
        Err(_) => "Failed to revoke session",
    }
}

fn create_rocket() -> Rocket<Build> {
    rocket::build()
        .attach(SessionManager::<AppSession>::default())
        .mount(
            "/",
            routes![get_user, admin_only_route, login, logout, session_id, revoke],
        )
}

fn create_rocket_with_store(store: Arc<MemoryStore>) -> Rocket<Build> {
    rocket::build()
        .attach(SessionManager::<AppSession>::builder().store(store).build())
        .mount(
            "/",
            routes![get_user, admin_only_route, login, logout, session_id, revoke],
        )
}

#[test]
fn test_unauthorized_access() {
    let client = Client::tracked(create_rocket()).unwrap();
    let response = client.get("/user").dispatch();
    assert_eq!(response.status(), Status::Unauthorized);
}

#[test]
fn test_login_logout_flow() {
    let client = Client::tracked(create_rocket()).unwrap();

    // Test login
    let login_response = client.post("/login?role=user").dispatch();
    assert_eq!(login_response.status(), Status::Ok);

    // Test accessing protected route after login
    let user_response = client.get("/user").dispatch();
    assert_eq!(user_response.status(), Status::Ok);
    assert_eq!(
        user_response.into_string(),
        Some("Logged in as user".into())
    );

    // Test logout
    let logout_response = client.post("/logout").dispatch();
    assert_eq!(logout_response.status(), Status::Ok);
    assert_eq!(logout_response.into_string(), Some("Logged out".into()));

    // Verify can't access protected route after logout
    let final_response = client.get("/user").dispatch();
    assert_eq!(final_response.status(), Status::Unauthorized);
}

#[test]
fn test_admin_access() {
    let client = Client::tracked(create_rocket()).unwrap();

    // Login as admin
    client.post("/login?role=admin").dispatch();

    // Test admin route access
    let response = client.get("/admin").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert!(response
        .into_string()
        .unwrap()
        .contains("Admin access granted"));
}

#[test]
fn test_non_admin_access() {
    let client = Client::tracked(create_rocket()).unwrap();

    // Login as regular user
    client.post("/login?role=user").dispatch();

    // Try to access admin route
    let response = client.get("/admin").dispatch();
    assert_eq!(response.status(), Status::Forbidden);
}

#[test]
fn test_revoking_another_session() {
    // Two server instances sharing one store, e.g. a deployment behind a
    // load balancer
    let store = Arc::new(MemoryStore::default());
    let admin = Client::tracked(create_rocket_with_store(store.clone())).unwrap();
    let victim = Client::tracked(create_rocket_with_store(store)).unwrap();

    victim.post("/login?role=user").dispatch();
    assert_eq!(victim.get("/user").dispatch().status(), Status::Ok);
    let victim_sid = victim.get("/session_id").dispatch().into_string().unwrap();

    // The admin revokes the victim's session by id
    admin.post("/login?role=admin").dispatch();
    let response = admin.post(format!("/revoke/{}", victim_sid)).dispatch();
    assert_eq!(response.into_string().unwrap(), "Session revoked");

    // The revoked id now reads as a fresh, logged-out session
    let response = victim.get("/user").dispatch();
    assert_eq!(response.status(), Status::Unauthorized);
}

#[get("/double")]
fn double_guard(mut first: Session<AppSession>, second: Session<AppSession>) -> &'static str {
    first.with_mut(|data| data.user = Some(User { role: UserRole::User }));
    // Both guards point at the same request-local state
    match second.with(|data| data.user.clone()) {
        Some(_) => "shared",
        None => "not shared",
    }
}

#[test]
fn test_one_store_read_per_request() {
    let finds = Arc::new(AtomicUsize::new(0));
    let upserts = Arc::new(AtomicUsize::new(0));
    let store = MockStore::default()
        .on_find({
            let finds = finds.clone();
            move |_id| {
                finds.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            }
        })
        .on_upsert({
            let upserts = upserts.clone();
            move |_id, _data, _expiry| {
                upserts.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });
    let rocket = rocket::build()
        .attach(SessionManager::<AppSession>::builder().store(store).build())
        .mount("/", routes![double_guard]);
    let client = Client::tracked(rocket).unwrap();

    let response = client
        .get("/double")
        .cookie(Cookie::new("sid", "some_session_id"))
        .dispatch();
    assert_eq!(response.into_string().unwrap(), "shared");

    // One find when the request came in, one upsert when it finished
    assert_eq!(finds.load(Ordering::SeqCst), 1);
    assert_eq!(upserts.load(Ordering::SeqCst), 1);
}
