//! API integration tests
//!
//! These tests run against a live server started with
//! FLOATLIB_BOOTSTRAP_EMAIL / FLOATLIB_BOOTSTRAP_PASSWORD matching the
//! SUPERUSER_* constants below. Run with:
//! cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:8080/api/v1";
const SUPERUSER_EMAIL: &str = "admin@floating-library.org";
const SUPERUSER_PASSWORD: &str = "admin-password";

fn unique_email(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Clock went backwards")
        .as_nanos();
    format!("{}-{}@example.org", prefix, nanos)
}

async fn sign_in(client: &Client, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/signin", BASE_URL))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send signin request");

    assert!(response.status().is_success(), "signin failed for {}", email);
    let body: Value = response.json().await.expect("Failed to parse signin response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Register a user, activate it through the seeded superuser, sign it in.
/// Returns (token, user_id, email).
async fn active_user(client: &Client, prefix: &str) -> (String, i64, String) {
    let email = unique_email(prefix);
    let password = "borrowed-books-4ever";

    let response = client
        .post(format!("{}/auth/signup", BASE_URL))
        .json(&json!({
            "name": prefix,
            "email": email,
            "password": password,
            "location": "Rotterdam"
        }))
        .send()
        .await
        .expect("Failed to send signup request");
    assert_eq!(response.status(), 201);

    // Find and activate the new account as the superuser
    let admin_token = sign_in(client, SUPERUSER_EMAIL, SUPERUSER_PASSWORD).await;
    let response = client
        .get(format!("{}/users/inactive", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to list inactive users");
    let users: Value = response.json().await.expect("Failed to parse users");
    let user_id = users
        .as_array()
        .expect("Expected user array")
        .iter()
        .find(|u| u["email"] == email.as_str())
        .and_then(|u| u["id"].as_i64())
        .expect("New user not found in inactive list");

    let response = client
        .post(format!("{}/users/{}/activate", BASE_URL, user_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to activate user");
    assert!(response.status().is_success());

    let token = sign_in(client, &email, password).await;
    (token, user_id, email)
}

async fn create_book(client: &Client, token: &str, title: &str) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": title,
            "author": "Test Author",
            "language": "en",
            "category": "fiction"
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse book response");
    body["id"].as_i64().expect("No book ID")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_signin_before_activation_is_forbidden() {
    let client = Client::new();
    let email = unique_email("inactive");

    let response = client
        .post(format!("{}/auth/signup", BASE_URL))
        .json(&json!({
            "name": "inactive",
            "email": email,
            "password": "borrowed-books-4ever"
        }))
        .send()
        .await
        .expect("Failed to send signup request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/auth/signin", BASE_URL))
        .json(&json!({ "email": email, "password": "borrowed-books-4ever" }))
        .send()
        .await
        .expect("Failed to send signin request");
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_signin_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/signin", BASE_URL))
        .json(&json!({
            "email": SUPERUSER_EMAIL,
            "password": "definitely-wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/borrow-requests", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_borrow_lifecycle() {
    let client = Client::new();

    let (owner_token, _owner_id, _) = active_user(&client, "lender").await;
    let (borrower_token, borrower_id, _) = active_user(&client, "borrower").await;
    let (other_token, _, _) = active_user(&client, "bystander").await;

    let book_id = create_book(&client, &owner_token, "The Left Hand of Darkness").await;

    // Owner cannot request their own book
    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // Borrower requests the book
    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let request: Value = response.json().await.expect("Failed to parse request");
    let request_id = request["id"].as_i64().expect("No request ID");
    assert_eq!(request["status"], "PENDING");

    // A duplicate pending request is rejected
    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // Only the owner may accept
    let response = client
        .post(format!("{}/borrow-requests/{}/accept", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", other_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    // Owner accepts: due date lands loan-period days after acceptance
    let response = client
        .post(format!("{}/borrow-requests/{}/accept", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let accepted: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(accepted["status"], "ACCEPTED");
    let accepted_at = accepted["accepted_at"].as_str().expect("No accepted_at");
    let return_date = accepted["return_date"].as_str().expect("No return_date");
    let accepted_at = chrono::DateTime::parse_from_rfc3339(accepted_at).unwrap();
    let return_date = chrono::DateTime::parse_from_rfc3339(return_date).unwrap();
    assert_eq!(return_date - accepted_at, chrono::Duration::days(14));

    // The book is no longer available to others
    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", other_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let book: Value = response.json().await.expect("Failed to parse book");
    assert_eq!(book["is_available"], false);

    // Borrower flag is set while the loan is open
    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");
    let me: Value = response.json().await.expect("Failed to parse user");
    assert_eq!(me["id"].as_i64(), Some(borrower_id));
    assert_eq!(me["is_borrower"], true);

    // Only the borrower may return
    let response = client
        .post(format!("{}/borrow-requests/{}/return", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", other_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    // Borrower returns on time
    let response = client
        .post(format!("{}/borrow-requests/{}/return", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let returned: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(returned["status"], "RETURNED");
    assert_eq!(returned["is_late"], false);

    // Last open loan returned: borrower flag clears, book frees up
    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");
    let me: Value = response.json().await.expect("Failed to parse user");
    assert_eq!(me["is_borrower"], false);

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let book: Value = response.json().await.expect("Failed to parse book");
    assert_eq!(book["is_available"], true);

    // A returned request cannot be returned again
    let response = client
        .post(format!("{}/borrow-requests/{}/return", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_borrow_limit() {
    let client = Client::new();

    let (owner_token, _, _) = active_user(&client, "collector").await;
    let (borrower_token, _, _) = active_user(&client, "hoarder").await;

    for i in 0..3 {
        let book_id = create_book(&client, &owner_token, &format!("Limit Tester {}", i)).await;

        let response = client
            .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
            .header("Authorization", format!("Bearer {}", borrower_token))
            .send()
            .await
            .expect("Failed to send request");

        if i < 2 {
            assert_eq!(response.status(), 201);
            let request: Value = response.json().await.expect("Failed to parse request");
            let request_id = request["id"].as_i64().expect("No request ID");

            let response = client
                .post(format!("{}/borrow-requests/{}/accept", BASE_URL, request_id))
                .header("Authorization", format!("Bearer {}", owner_token))
                .send()
                .await
                .expect("Failed to send request");
            assert!(response.status().is_success());
        } else {
            // Two books already out: the third request is refused
            assert_eq!(response.status(), 400);
        }
    }
}

#[tokio::test]
#[ignore]
async fn test_review_toggle_round_trip() {
    let client = Client::new();

    let (owner_token, _, _) = active_user(&client, "writer").await;
    let (reader_token, _, _) = active_user(&client, "reader").await;

    let book_id = create_book(&client, &owner_token, "Toggle Me").await;

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let book: Value = response.json().await.expect("Failed to parse book");
    let original = book["rating"].as_i64().expect("No rating");

    let response = client
        .post(format!("{}/books/{}/review", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", reader_token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["rating"].as_i64(), Some(original + 1));
    assert_eq!(body["reviewed"], true);

    let response = client
        .post(format!("{}/books/{}/review", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", reader_token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["rating"].as_i64(), Some(original));
    assert_eq!(body["reviewed"], false);
}

#[tokio::test]
#[ignore]
async fn test_comment_vote_toggle() {
    let client = Client::new();

    let (owner_token, _, _) = active_user(&client, "author").await;
    let (voter_token, _, _) = active_user(&client, "voter").await;

    let book_id = create_book(&client, &owner_token, "Much Discussed").await;

    let response = client
        .post(format!("{}/books/{}/comments", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .json(&json!({ "content": "A favourite of mine" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let comment: Value = response.json().await.expect("Failed to parse comment");
    let comment_id = comment["id"].as_i64().expect("No comment ID");

    // First upvote counts
    let response = client
        .post(format!("{}/comments/{}/vote", BASE_URL, comment_id))
        .header("Authorization", format!("Bearer {}", voter_token))
        .json(&json!({ "vote": "upvote" }))
        .send()
        .await
        .expect("Failed to send request");
    let tally: Value = response.json().await.expect("Failed to parse tally");
    assert_eq!(tally["upvotes"].as_i64(), Some(1));
    assert_eq!(tally["downvotes"].as_i64(), Some(0));

    // Switching moves the count across
    let response = client
        .post(format!("{}/comments/{}/vote", BASE_URL, comment_id))
        .header("Authorization", format!("Bearer {}", voter_token))
        .json(&json!({ "vote": "downvote" }))
        .send()
        .await
        .expect("Failed to send request");
    let tally: Value = response.json().await.expect("Failed to parse tally");
    assert_eq!(tally["upvotes"].as_i64(), Some(0));
    assert_eq!(tally["downvotes"].as_i64(), Some(1));

    // Repeating removes the vote
    let response = client
        .post(format!("{}/comments/{}/vote", BASE_URL, comment_id))
        .header("Authorization", format!("Bearer {}", voter_token))
        .json(&json!({ "vote": "downvote" }))
        .send()
        .await
        .expect("Failed to send request");
    let tally: Value = response.json().await.expect("Failed to parse tally");
    assert_eq!(tally["upvotes"].as_i64(), Some(0));
    assert_eq!(tally["downvotes"].as_i64(), Some(0));
}

#[tokio::test]
#[ignore]
async fn test_wishlist_round_trip() {
    let client = Client::new();

    let (owner_token, _, _) = active_user(&client, "owner").await;
    let (user_token, _, _) = active_user(&client, "wisher").await;

    let book_id = create_book(&client, &owner_token, "Wanted Reading").await;

    let response = client
        .post(format!("{}/books/{}/wishlist", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", user_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .get(format!("{}/wishlist", BASE_URL))
        .header("Authorization", format!("Bearer {}", user_token))
        .send()
        .await
        .expect("Failed to send request");
    let items: Value = response.json().await.expect("Failed to parse wishlist");
    assert!(items
        .as_array()
        .expect("Expected array")
        .iter()
        .any(|item| item["book"]["id"].as_i64() == Some(book_id)));

    let response = client
        .delete(format!("{}/books/{}/wishlist", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", user_token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // Removing twice is a 404
    let response = client
        .delete(format!("{}/books/{}/wishlist", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", user_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_otp_verification_rejects_wrong_code() {
    let client = Client::new();
    let (_token, _, email) = active_user(&client, "forgetful").await;

    let response = client
        .post(format!("{}/auth/forgot-password", BASE_URL))
        .json(&json!({ "email": email }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // The real code went out by email; a guess must not pass
    let response = client
        .post(format!("{}/auth/verify-otp", BASE_URL))
        .json(&json!({ "email": email, "otp": "000000" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let response = client
        .post(format!("{}/auth/forgot-password", BASE_URL))
        .json(&json!({ "email": "nobody@example.org" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_book_search() {
    let client = Client::new();
    let (owner_token, _, _) = active_user(&client, "librarian").await;

    create_book(&client, &owner_token, "A Very Unusual Phrase Indeed").await;

    let response = client
        .get(format!("{}/books/search?q=unusual phrase", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let books: Value = response.json().await.expect("Failed to parse books");
    assert!(!books.as_array().expect("Expected array").is_empty());

    // Empty query is a 400
    let response = client
        .get(format!("{}/books/search", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // No match is a 404
    let response = client
        .get(format!("{}/books/search?q=zzzzzz-no-such-book", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}
