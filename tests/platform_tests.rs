//! Typed accessors on the platform client.

mod common;

use std::sync::Arc;

use reqwest::Method;
use serde_json::json;

use common::{document, resource, MockTransport};
use waypost::cache::ResourceKey;
use waypost::storage::STORAGE_PATH;
use waypost::{ClientOptions, ListQuery, PlatformClient};

fn client_with(transport: Arc<MockTransport>, options: ClientOptions) -> PlatformClient {
  PlatformClient::new(transport, options)
}

#[tokio::test]
async fn accessors_hit_their_endpoints_once() {
  let transport = Arc::new(MockTransport::new());
  transport
    .respond(Method::GET, "/api/v3/employees/1", document("employees", "1", vec![]))
    .respond(Method::GET, "/api/v3/locations/2", document("locations", "2", vec![]))
    .respond(Method::GET, "/api/v3/invites/3", document("invites", "3", vec![]))
    .respond(Method::GET, "/api/v3/users/4", document("users", "4", vec![]));
  let client = client_with(Arc::clone(&transport), ClientOptions::default());

  let (employee, location, invite, user) = tokio::join!(
    client.get_employee("1"),
    client.get_location("2"),
    client.get_invite("3"),
    client.get_user("4"),
  );
  assert_eq!(employee.unwrap().kind, "employees");
  assert_eq!(location.unwrap().kind, "locations");
  assert_eq!(invite.unwrap().kind, "invites");
  assert_eq!(user.unwrap().kind, "users");

  client.get_employee("1").await.unwrap();
  client.get_location("2").await.unwrap();
  assert_eq!(transport.total(), 4);
}

#[tokio::test]
async fn employee_with_flow_primes_flow_and_alias() {
  let transport = Arc::new(MockTransport::new());
  transport.respond(
    Method::GET,
    "/api/v3/employees/1",
    document("employees", "1", vec![resource("flows", "42")]),
  );
  let client = client_with(Arc::clone(&transport), ClientOptions::default());

  let employee = client.get_employee_with_flow("1").await.unwrap();
  assert_eq!(employee.id, "1");
  assert_eq!(transport.requests()[0].query_value("include"), Some("flow"));

  let flow = client.get_flow("42").await.unwrap();
  let screening = client.get_employee_screening_flow("42").await.unwrap();
  assert!(Arc::ptr_eq(&flow, &screening));
  assert_eq!(transport.total(), 1);
}

#[tokio::test]
async fn employee_flow_follows_the_relationship_from_cache() {
  let transport = Arc::new(MockTransport::new());
  transport.respond(
    Method::GET,
    "/api/v3/employees/1",
    json!({
      "data": {
        "type": "employees",
        "id": "1",
        "relationships": { "flow": { "data": { "type": "flows", "id": "42" } } }
      },
      "included": [resource("flows", "42")]
    }),
  );
  transport.respond(Method::GET, "/api/v3/employees/2", document("employees", "2", vec![]));
  let client = client_with(Arc::clone(&transport), ClientOptions::default());

  let flow = client.get_employee_flow("1").await.unwrap().unwrap();
  assert_eq!(flow.id, "42");
  assert_eq!(flow.attribute("label"), Some(&json!("flows 42")));
  assert_eq!(transport.total(), 1);

  assert!(client.get_employee_flow("2").await.unwrap().is_none());
}

#[tokio::test]
async fn list_queries_bypass_the_loader_but_prime_the_cache() {
  let transport = Arc::new(MockTransport::new());
  transport.respond(
    Method::GET,
    "/api/v3/employees",
    json!({
      "data": [resource("employees", "1"), resource("employees", "2")],
      "included": [resource("locations", "9")],
      "meta": { "total": 2 }
    }),
  );
  let client = client_with(Arc::clone(&transport), ClientOptions::default());
  let query = ListQuery::new().filter("status", "active").sort("-created_at").per_page(2);

  let first = client.get_employees(&query).await.unwrap();
  let second = client.get_employees(&query).await.unwrap();
  assert_eq!(first, second);
  assert_eq!(first.data.len(), 2);
  assert_eq!(first.meta, Some(json!({ "total": 2 })));
  assert_eq!(transport.count(Method::GET, "/api/v3/employees"), 2);

  let request = &transport.requests()[0];
  assert_eq!(request.query_value("filter[status]"), Some("active"));
  assert_eq!(request.query_value("sort"), Some("-created_at"));
  assert_eq!(request.query_value("page[size]"), Some("2"));

  client.get_employee("2").await.unwrap();
  client.get_location("9").await.unwrap();
  assert_eq!(transport.total(), 2);
  assert_eq!(client.loader().stats().cache_hits, 2);
}

#[tokio::test]
async fn invites_list_uses_invites_endpoint() {
  let transport = Arc::new(MockTransport::new());
  transport.respond(Method::GET, "/api/v3/invites", json!({ "data": [] }));
  let client = client_with(Arc::clone(&transport), ClientOptions::default());

  let invites = client.get_invites(&ListQuery::new().page(3)).await.unwrap();
  assert!(invites.data.is_empty());
  assert_eq!(transport.requests()[0].query_value("page[number]"), Some("3"));
}

#[tokio::test]
async fn raw_api_calls_prime_the_cache() {
  let transport = Arc::new(MockTransport::new());
  transport.respond(
    Method::PATCH,
    "/api/v3/employees/1",
    document("employees", "1", vec![]),
  );
  let client = client_with(Arc::clone(&transport), ClientOptions::default());

  client
    .api()
    .patch("/api/v3/employees/1", json!({ "data": { "attributes": { "x": 1 } } }))
    .await
    .unwrap();
  assert!(client
    .loader()
    .cache()
    .contains(&ResourceKey::new("employees", "1")));

  client.get_employee("1").await.unwrap();
  assert_eq!(transport.count(Method::GET, "/api/v3/employees/1"), 0);
}

#[tokio::test]
async fn storage_uses_configured_install_id() {
  let transport = Arc::new(MockTransport::new());
  transport.respond(Method::POST, STORAGE_PATH, json!({ "data": [null] }));
  let options = ClientOptions {
    install_id: Some("inst_9".into()),
    ..ClientOptions::default()
  };
  let client = client_with(Arc::clone(&transport), options);

  client.storage().get("a").execute().await.unwrap();
  client.storage_for("inst_other").get("a").execute().await.unwrap();

  let requests = transport.requests();
  assert_eq!(requests[0].body.as_ref().unwrap()["install_id"], json!("inst_9"));
  assert_eq!(
    requests[1].body.as_ref().unwrap()["install_id"],
    json!("inst_other")
  );
}

#[tokio::test]
async fn empty_id_is_rejected_without_a_request() {
  let transport = Arc::new(MockTransport::new());
  let client = client_with(Arc::clone(&transport), ClientOptions::default());

  let err = client.get_flow("").await.unwrap_err();
  assert!(matches!(err, waypost::ApiError::InvalidRequest(_)));
  assert_eq!(transport.total(), 0);
}
