//! HTTP-level behaviour of `MusesClient` against a mock MuSES backend.

use muses_client::domain::TaskCompletionRequest;
use muses_client::services::{MissionFetcher, QuestFetcher, RewardDesk, TaskCompleter};
use muses_client::{ClientError, MusesClient, Session};
use reqwest::StatusCode;
use serde_json::json;
use url::Url;
use wiremock::matchers::{basic_auth, body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, session: Session) -> MusesClient {
    let url = Url::parse(&server.uri()).unwrap();
    MusesClient::new(&url, session, 5).unwrap()
}

#[tokio::test]
async fn login_establishes_session_and_token_is_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/login"))
        .and(basic_auth("visitor", "secret"))
        .and(header("RBAC-Name", "USER"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"token": "tok-123"}))
                .insert_header("EntityID", "user-42"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missions/user/user-42"))
        .and(header("Authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::new();
    let client = client(&server, session.clone());

    let login = client.login("visitor", "secret", "USER").await.unwrap();
    assert_eq!(login.token, "tok-123");
    assert_eq!(login.entity_id.as_deref(), Some("user-42"));
    assert_eq!(session.entity_id().as_deref(), Some("user-42"));

    let missions = client.list_missions("user-42", None).await.unwrap();
    assert!(missions.is_empty());

    client.logout();
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn failed_login_leaves_session_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "User not authorized"})))
        .mount(&server)
        .await;

    let session = Session::new();
    let err = client(&server, session.clone())
        .login("visitor", "wrong", "USER")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ClientError::Unauthorized { status, ref body, .. }
            if status == StatusCode::UNAUTHORIZED && body.as_deref() == Some("User not authorized")
    ));
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn wrapped_missions_are_normalised() {
    let server = MockServer::start().await;

    let missions = json!([
        {"_id": "m1", "status": "ACTIVE", "steps": [{"step_id": "q1", "completed": false}], "user_id": "u1"},
        {"_id": "m2", "status": "COMPLETE", "steps": [], "user_id": "u1"}
    ]);

    Mock::given(method("GET"))
        .and(path("/missions/user/u1"))
        .and(header_exists("x-request-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([missions, 200])))
        .mount(&server)
        .await;

    let list = client(&server, Session::new())
        .list_missions("u1", Some("rid-1"))
        .await
        .unwrap();

    assert_eq!(list.len(), 2);
    assert_eq!(list.active().map(|(_, m)| m.id.as_str()), Some("m1"));
}

#[tokio::test]
async fn missions_raw_body_is_passed_through() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missions/user/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let raw = client(&server, Session::new())
        .fetch_missions_raw("u1", None)
        .await
        .unwrap();
    assert_eq!(raw, "null");
}

#[tokio::test]
async fn quest_fetch_handles_body_and_null() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/quests/q1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quest": {
                "_id": "q1",
                "title": "Sannio bronzes",
                "description": "Find the bronzes",
                "status": "PENDING",
                "subject_id": "s1",
                "tasks": {
                    "T42": {"completed": false, "description": "Scan the statue", "title": "Statue"}
                }
            },
            "tasks_completed": 0,
            "tot_tasks": 1
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/quests/q-null"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let client = client(&server, Session::new());

    let quest = client.fetch_quest("q1", None).await.unwrap().expect("quest body");
    assert!(quest.quest.contains_task("T42"));
    assert_eq!(quest.total_tasks, 1);

    assert_eq!(client.fetch_quest("q-null", None).await.unwrap(), None);

    let err = client.fetch_quest("q-missing", None).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound { .. }));
}

#[tokio::test]
async fn completion_posts_request_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/recognition/u1"))
        .and(body_json(json!({"task_id": "T42", "mission_id": "m1", "quest_id": "q2"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server, Session::new())
        .complete_task("u1", &TaskCompletionRequest::new("T42", "m1", "q2"), None)
        .await
        .unwrap();
}

#[tokio::test]
async fn completion_rejection_keeps_status_and_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/recognition/u1"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"message": "Expected json body with the required parameters"})),
        )
        .mount(&server)
        .await;

    let err = client(&server, Session::new())
        .complete_task("u1", &TaskCompletionRequest::new("T42", "m1", "q2"), None)
        .await
        .unwrap_err();

    match err {
        ClientError::Rejected { status, message, body } => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(message, "Bad Request");
            assert_eq!(body.as_deref(), Some("Expected json body with the required parameters"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn forbidden_completion_keeps_its_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/recognition/u1"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Quest locked"})))
        .mount(&server)
        .await;

    let err = client(&server, Session::new())
        .complete_task("u1", &TaskCompletionRequest::new("T42", "m1", "q2"), None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    assert_eq!(err.user_message(), "Forbidden (Quest locked)");
}

#[tokio::test]
async fn mission_generation_and_start() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/missions/u1"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"mission": "m9"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/missions/start/m9"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, Session::new());
    client.generate_mission("u1", None).await.unwrap();
    client.start_mission("m9", None).await.unwrap();
}

#[tokio::test]
async fn reward_details_and_use() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/rewards/details/r-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reward": {
                "amount": 10,
                "description": "Ticket discount",
                "museum_id": "museo-1",
                "reduction_type": "PERCENTAGE",
                "subject": "ticket"
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/user/rewards/r-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": "OK-1"})))
        .mount(&server)
        .await;

    let client = client(&server, Session::with_token("staff", None));

    let details = client.reward_details("r-1").await.unwrap();
    assert_eq!(details.reward.amount, 10);
    assert_eq!(client.use_reward("r-1").await.unwrap().code, "OK-1");
}

#[tokio::test]
async fn owned_rewards_are_listed_for_the_visitor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/rewards/owned/u1"))
        .and(header("Authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "rewards": [
                {"_id": "ur1", "reward_id": "r1", "used": true, "user_id": "u1"},
                {"_id": "ur2", "reward_id": "r2", "used": false, "user_id": "u1"}
            ]
        })))
        .mount(&server)
        .await;

    let owned = client(&server, Session::with_token("tok", Some("u1".into())))
        .owned_rewards("u1")
        .await
        .unwrap();

    assert_eq!(owned.count, 2);
    assert_eq!(owned.available().map(|r| r.id.as_str()).collect::<Vec<_>>(), ["ur2"]);
}

#[tokio::test]
async fn museums_and_their_artworks() {
    let server = MockServer::start().await;

    let museum = json!({
        "_id": "museo-1",
        "name": "Museo del Sannio",
        "description": "Archaeology and art",
        "location": {"latitude": 41.13, "longitude": 14.78},
        "hours": "9-19",
        "price": "5 EUR",
        "imageurl": "https://example.org/sannio.jpg",
        "types": ["archaeology"]
    });

    Mock::given(method("GET"))
        .and(path("/museums"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([museum.clone()])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/museums/museo-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(museum))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/artworks/search"))
        .and(query_param("museum", "museo-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "a1", "name": "Iside", "description": "", "imageurl": "", "museum": "museo-1", "types": []},
            {"_id": "a2", "name": "Hercules", "museum": "museo-1", "is_exposed": false}
        ])))
        .mount(&server)
        .await;

    let client = client(&server, Session::new());

    let museums = client.list_museums().await.unwrap();
    assert_eq!(museums.len(), 1);
    assert_eq!(client.get_museum("museo-1").await.unwrap(), museums[0]);

    let artworks = client.search_artworks("museo-1").await.unwrap();
    let displayed: Vec<&str> = artworks
        .iter()
        .filter(|a| a.is_on_display())
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(displayed, ["Iside"]);

    let err = client.get_museum("museo-9").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn quest_catalogue_and_user_profile() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/quests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "q1", "title": "Bronzes", "tasks": {"T1": {"title": "Statue"}}},
            {"_id": "q2", "title": "Mosaics"}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "u1",
            "firstname": "Ada",
            "lastname": "Rossi",
            "username": "ada",
            "email": "ada@example.org",
            "birthday": "1990-05-01T00:00:00Z",
            "country": "IT",
            "avatar_url": null,
            "preferences": ["archaeology"],
            "range_preferences": 12.5
        })))
        .mount(&server)
        .await;

    let client = client(&server, Session::new());

    let quests = client.list_quests().await.unwrap();
    assert_eq!(quests.len(), 2);
    assert!(quests[0].contains_task("T1"));
    assert!(quests[1].tasks.is_empty());

    let user = client.get_user("u1").await.unwrap();
    assert_eq!(user.display_name(), "Ada Rossi");
    assert_eq!(user.range_preferences, Some(12.5));
    assert_eq!(user.avatar_url, None);
}

#[tokio::test]
async fn register_sends_credentials_and_role() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .and(header("RBAC-Request", "USER"))
        .and(body_json(json!({"username": "ada", "password": "secret"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Registration completed successfully"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, Session::new());
    client.register("ada", "secret", "USER").await.unwrap();
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "Username already taken"})))
        .mount(&server)
        .await;

    let err = client(&server, Session::new())
        .register("ada", "secret", "USER")
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Bad Request (Username already taken)");
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    // Nothing listens on the discard port.
    let url = Url::parse("http://127.0.0.1:9/").unwrap();
    let client = MusesClient::new(&url, Session::new(), 2).unwrap();

    let err = client.fetch_missions_raw("u1", None).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
}
