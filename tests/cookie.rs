#[macro_use]
extern crate rocket;

use rocket::{
    http::{Cookie, SameSite, Status},
    local::blocking::Client,
    time::{Duration, OffsetDateTime},
    {routes, Build, Rocket},
};
use rocket_sessions::{Session, SessionManager};

// 2080-01-01 00:00:00 UTC
fn fixed_now() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(3_471_292_800).unwrap()
}

#[post("/count")]
fn count(mut session: Session<u32>) -> String {
    session.with_mut(|count| {
        *count += 1;
        count.to_string()
    })
}

fn create_rocket() -> Rocket<Build> {
    rocket::build()
        .attach(
            SessionManager::<u32>::builder()
                .clock(fixed_now)
                .generate(|| Ok("random_id".to_owned()))
                .build(),
        )
        .mount("/", routes![count])
}

#[test]
fn test_default_cookie_attributes() {
    let client = Client::tracked(create_rocket()).unwrap();
    let response = client.post("/count").dispatch();
    assert_eq!(response.status(), Status::Ok);

    let cookie = response
        .cookies()
        .get("sid")
        .expect("should have session cookie");
    assert_eq!(cookie.value(), "random_id");
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert_eq!(cookie.secure(), None, "Secure is off by default");
    assert_eq!(
        cookie.expires_datetime(),
        Some(fixed_now() + Duration::days(7))
    );

    let set_cookie = response.headers().get_one("Set-Cookie").unwrap();
    assert!(set_cookie.starts_with("sid=random_id"));
    assert!(set_cookie.contains("Expires=Mon, 08 Jan 2080 00:00:00 GMT"));

    assert_eq!(response.into_string().unwrap(), "1");
}

#[test]
fn test_cookie_sent_on_every_response() {
    let client = Client::tracked(create_rocket()).unwrap();

    let first = client.post("/count").dispatch();
    let first_header = first.headers().get_one("Set-Cookie").unwrap().to_owned();
    assert_eq!(first.into_string().unwrap(), "1");

    let second = client.post("/count").dispatch();
    let second_header = second.headers().get_one("Set-Cookie").unwrap().to_owned();
    assert_eq!(second.into_string().unwrap(), "2");

    // Same id, same expiry: the lifetime is fixed at creation, not rolling
    assert_eq!(first_header, second_header);
}

#[test]
fn test_unknown_session_id_gets_fresh_session() {
    let client = Client::tracked(create_rocket()).unwrap();
    let response = client
        .post("/count")
        .cookie(Cookie::new("sid", "forged_or_expired_id"))
        .dispatch();

    // Unknown id is treated like no session at all
    assert_eq!(response.status(), Status::Ok);
    let cookie = response.cookies().get("sid").unwrap();
    assert_eq!(cookie.value(), "random_id", "Cookie is replaced");
    assert_eq!(response.into_string().unwrap(), "1");
}

#[test]
fn test_custom_cookie_options() {
    let rocket = rocket::build()
        .attach(
            SessionManager::<u32>::builder()
                .with_options(|opt| {
                    opt.cookie_name = "my_app_session".to_owned();
                    opt.path = "/api".to_owned();
                    opt.same_site = SameSite::Strict;
                    opt.secure = true;
                    opt.http_only = false;
                    opt.ttl = Duration::hours(1);
                })
                .clock(fixed_now)
                .build(),
        )
        .mount("/api", routes![count]);
    let client = Client::tracked(rocket).unwrap();

    let response = client.post("/api/count").dispatch();
    let cookie = response
        .cookies()
        .get("my_app_session")
        .expect("should have session cookie");
    assert_eq!(cookie.path(), Some("/api"));
    assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.http_only(), None, "HttpOnly disabled");
    assert_eq!(
        cookie.expires_datetime(),
        Some(fixed_now() + Duration::hours(1))
    );
}
