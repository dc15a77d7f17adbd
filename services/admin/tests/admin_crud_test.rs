//! 角色、菜单、用户管理接口

mod common;

use axum::http::StatusCode;
use common::{TestApp, menu, role};
use console_common::{MenuId, RoleId};
use serde_json::json;

async fn admin() -> (TestApp, String) {
    let app = TestApp::new();
    app.seed_user("root", "password1", &[]);
    let token = app.login("root", "password1").await;
    (app, token)
}

#[tokio::test]
async fn test_crud_requires_auth() {
    let app = TestApp::new();
    for uri in ["/api/role/list", "/api/menu/tree", "/api/user/list"] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(response.json()["code"], 3);
    }
}

#[tokio::test]
async fn test_role_lifecycle() {
    let (app, token) = admin().await;
    app.menus.insert(menu(10, 0, 0));
    app.menus.insert(menu(20, 0, 0));

    let response = app
        .post(
            "/api/role/create",
            Some(&token),
            json!({"name": "admin", "menuIds": [10, 20, 10]}),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    let parent_id = response.json()["data"]["id"].as_i64().unwrap();
    assert_eq!(response.json()["data"]["menuIds"], json!([10, 20]));

    let response = app
        .post(
            "/api/role/create",
            Some(&token),
            json!({"name": "editor", "parentId": parent_id, "menuIds": [20]}),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let child_id = response.json()["data"]["id"].as_i64().unwrap();

    let response = app.get("/api/role/tree", Some(&token)).await;
    let tree = response.json()["data"].clone();
    assert_eq!(tree[0]["id"], parent_id);
    assert_eq!(tree[0]["children"][0]["id"], child_id);

    let response = app.get("/api/role/list?page=1&pageSize=1", Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    let data = response.json()["data"].clone();
    assert_eq!(data["total"], 2);
    assert_eq!(data["items"].as_array().unwrap().len(), 1);
    assert_eq!(data["pageSize"], 1);

    // 有子角色时不可删除
    let response = app
        .post("/api/role/delete", Some(&token), json!({"id": parent_id}))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = app
        .post(
            "/api/role/update",
            Some(&token),
            json!({"id": child_id, "name": "writer", "parentId": 0, "menuIds": []}),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.roles.get(RoleId(child_id)).unwrap().name, "writer");

    let response = app
        .post("/api/role/delete", Some(&token), json!({"id": parent_id}))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(app.roles.get(RoleId(parent_id)).is_none());
}

#[tokio::test]
async fn test_role_write_validation() {
    let (app, token) = admin().await;
    app.roles.insert(role(1, 0, &[]));
    app.roles.insert(role(2, 1, &[]));

    let response = app
        .post(
            "/api/role/create",
            Some(&token),
            json!({"name": "orphan", "parentId": 77}),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .post(
            "/api/role/create",
            Some(&token),
            json!({"name": "bad-menu", "menuIds": [404]}),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // 1 挂到自己的子角色 2 下会成环
    let response = app
        .post(
            "/api/role/update",
            Some(&token),
            json!({"id": 1, "name": "role-1", "parentId": 2}),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(
        response.json()["message"]
            .as_str()
            .unwrap()
            .contains("cycle")
    );

    let response = app
        .post(
            "/api/role/update",
            Some(&token),
            json!({"id": 99, "name": "missing"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .post("/api/role/create", Some(&token), json!({"name": ""}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_menu_lifecycle() {
    let (app, token) = admin().await;

    let response = app
        .post(
            "/api/menu/create",
            Some(&token),
            json!({"name": "system", "icon": "setting", "serialNum": 1, "type": "menu"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    let system = response.json()["data"]["id"].as_i64().unwrap();
    assert_eq!(response.json()["data"]["type"], "menu");

    let response = app
        .post(
            "/api/menu/create",
            Some(&token),
            json!({"name": "users", "parentId": system, "serialNum": 5, "hideChildren": true}),
        )
        .await;
    let users = response.json()["data"]["id"].as_i64().unwrap();

    let response = app
        .post(
            "/api/menu/create",
            Some(&token),
            json!({"name": "dashboard", "serialNum": 9}),
        )
        .await;
    let dashboard = response.json()["data"]["id"].as_i64().unwrap();

    let response = app.get("/api/menu/tree", Some(&token)).await;
    let tree = response.json()["data"].clone();
    assert_eq!(tree[0]["id"], dashboard);
    assert_eq!(tree[1]["id"], system);
    assert_eq!(tree[1]["children"][0]["id"], users);
    assert_eq!(tree[1]["children"][0]["meta"]["hideChildren"], true);

    let response = app
        .post(
            "/api/menu/update",
            Some(&token),
            json!({"id": system, "name": "system", "parentId": users}),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .post("/api/menu/delete", Some(&token), json!({"id": system}))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = app
        .post(
            "/api/menu/update",
            Some(&token),
            json!({"id": users, "name": "members", "show": false}),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let updated = app.menus.get(MenuId(users)).unwrap();
    assert_eq!(updated.name, "members");
    assert!(!updated.show);
    assert!(updated.parent_id.is_root());

    let response = app.get("/api/menu/list?pageSize=2", Some(&token)).await;
    assert_eq!(response.json()["data"]["total"], 3);
    assert_eq!(response.json()["data"]["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_current_menu_fails_on_missing_menu() {
    let app = TestApp::new();
    app.roles.insert(role(1, 0, &[1, 2]));
    app.menus.insert(menu(1, 0, 0));
    app.seed_user("luke", "password1", &[1]);
    let token = app.login("luke", "password1").await;

    let response = app.get("/api/menu/current", Some(&token)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(body["code"], -1);
    assert_eq!(body["message"], "Role references missing menu 2");
    assert_eq!(body["data"], json!({}));
}

#[tokio::test]
async fn test_menu_assigned_to_role_cannot_be_deleted() {
    let (app, token) = admin().await;
    app.menus.insert(menu(1, 0, 0));
    app.menus.insert(menu(2, 0, 0));
    app.roles.insert(role(7, 0, &[2]));

    let response = app
        .post("/api/menu/delete", Some(&token), json!({"id": 2}))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert!(
        response.json()["message"]
            .as_str()
            .unwrap()
            .contains("role 7")
    );
    assert!(app.menus.get(MenuId(2)).is_some());

    let response = app
        .post(
            "/api/role/update",
            Some(&token),
            json!({"id": 7, "name": "role-7", "menuIds": [1]}),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .post("/api/menu/delete", Some(&token), json!({"id": 2}))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(app.menus.get(MenuId(2)).is_none());
}

#[tokio::test]
async fn test_list_with_huge_page_number_is_empty() {
    let (app, token) = admin().await;
    app.roles.insert(role(1, 0, &[]));

    for uri in [
        "/api/role/list?page=4294967295&pageSize=200",
        "/api/menu/list?page=4294967295&pageSize=200",
        "/api/user/list?page=4294967295&pageSize=200",
    ] {
        let response = app.get(uri, Some(&token)).await;
        assert_eq!(response.status, StatusCode::OK, "{}", uri);
        let data = response.json()["data"].clone();
        assert_eq!(data["items"], json!([]), "{}", uri);
        assert_eq!(data["page"], 4_294_967_295u64);
    }
}

#[tokio::test]
async fn test_current_menu_without_roles_is_empty() {
    let (app, token) = admin().await;
    app.menus.insert(menu(1, 0, 0));

    let response = app.get("/api/menu/current", Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["data"], json!([]));
}

#[tokio::test]
async fn test_user_management() {
    let (app, token) = admin().await;
    app.roles.insert(role(1, 0, &[]));
    let mia = app.seed_user("mia", "password1", &[]);
    app.seed_user("ned", "password1", &[]);

    let response = app
        .post(
            "/api/user/update",
            Some(&token),
            json!({"id": mia.0, "email": "MIA@new.example.com", "roleIds": [1, 1], "info": {"nick": "M"}}),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    let data = response.json()["data"].clone();
    assert_eq!(data["email"], "mia@new.example.com");
    assert_eq!(data["roleIds"], json!([1]));
    assert_eq!(data["info"]["nick"], "M");

    let response = app
        .post(
            "/api/user/update",
            Some(&token),
            json!({"id": mia.0, "roleIds": [5]}),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .post(
            "/api/user/update",
            Some(&token),
            json!({"id": mia.0, "email": "ned@example.com"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = app.get("/api/user/list", Some(&token)).await;
    assert_eq!(response.json()["data"]["total"], 3);

    let response = app
        .post("/api/user/delete", Some(&token), json!({"id": mia.0}))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .post("/api/user/delete", Some(&token), json!({"id": mia.0}))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.get("/api/user/list", Some(&token)).await;
    let names: Vec<String> = response.json()["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["userName"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["root", "ned"]);
}
