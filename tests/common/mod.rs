#![allow(dead_code)]

use chrono::{Duration, Utc};

use oauth2_mongo_model::models::{
    revoked_at, Client, ClientRecord, GrantType, NewAuthorizationCode, NewToken, User,
};
use oauth2_mongo_model::storage::{DynRecordStore, RecordStore};
use oauth2_mongo_model::{OAuthModel, StoreModel};

pub struct Seeded {
    pub model: StoreModel,
    pub store: DynRecordStore,
    pub client: Client,
    pub user: User,
}

/// Store a user `U1` (password `wonderland`) and a client `C1` owned by it.
pub async fn seed(store: DynRecordStore) -> Result<Seeded, Box<dyn std::error::Error>> {
    let user = User::with_password("U1".to_string(), "wonderland")?;
    store.insert_user(&user).await?;

    let record = ClientRecord::new(
        "C1".to_string(),
        Some("c1-secret".to_string()),
        "http://localhost/cb".to_string(),
    )
    .with_scope("read write")
    .with_user(user.id.clone());
    store.insert_client(&record).await?;

    Ok(Seeded {
        model: StoreModel::new(store.clone()),
        store,
        client: Client::from(record),
        user,
    })
}

/// A contract test suite every `RecordStore` backend must satisfy when driven
/// through the model adapter.
pub async fn run_model_contract(store: DynRecordStore) -> Result<(), Box<dyn std::error::Error>> {
    let Seeded {
        model,
        store,
        client,
        user,
    } = seed(store).await?;

    // Unknown bearer tokens are not found, not errors.
    assert!(model.get_access_token("never-issued").await?.is_none());

    // Client lookup always reports the fixed grant list.
    let fetched_client = model
        .get_client("C1", Some("c1-secret"))
        .await?
        .ok_or("client should exist")?;
    assert_eq!(fetched_client, client);
    assert_eq!(fetched_client.grants, GrantType::ALL.to_vec());
    assert!(model.get_client("C1", Some("wrong")).await?.is_none());

    // Password grant.
    assert_eq!(model.get_user("U1", "wonderland").await?, Some(user.clone()));
    assert!(model.get_user("U1", "Wonderland").await?.is_none());
    assert!(model.get_user("nobody", "wonderland").await?.is_none());

    // Token pair roundtrip.
    let expires = Utc::now() + Duration::hours(1);
    let new_token = NewToken {
        access_token: "abc".to_string(),
        access_token_expires_at: Some(expires),
        refresh_token: Some("xyz".to_string()),
        refresh_token_expires_at: Some(expires + Duration::days(30)),
        scope: Some("read".to_string()),
    };
    let saved = model.save_token(&new_token, &client, &user).await?;
    assert_eq!(saved.client, client);
    assert_eq!(saved.user, user);
    assert_eq!(saved.refresh_token.as_deref(), Some("xyz"));

    let access_record = store
        .find_access_token("abc")
        .await?
        .ok_or("access token record should exist")?;
    let refresh_record = store
        .find_refresh_token("xyz")
        .await?
        .ok_or("refresh token record should exist")?;
    assert_eq!(access_record.client_id, client.id);
    assert_eq!(access_record.user_id, user.id);
    assert_eq!(refresh_record.client_id, client.id);
    assert_eq!(refresh_record.user_id, user.id);

    let access = model
        .get_access_token("abc")
        .await?
        .ok_or("access token should resolve")?;
    assert_eq!(access.user, user);
    assert_eq!(access.client, client);
    assert_eq!(access.scope.as_deref(), Some("read"));
    assert!(!access.is_expired());
    assert!(model.verify_scope(&access, "read"));

    let refresh = model
        .get_refresh_token("xyz")
        .await?
        .ok_or("refresh token should resolve")?;
    assert_eq!(refresh.refresh_token, "xyz");
    assert_eq!(refresh.user, user);
    assert_eq!(refresh.client, client);
    assert_eq!(refresh.scope.as_deref(), Some("read"));

    // Uniqueness parity: the same access token cannot be stored twice.
    let dup = model.save_token(&new_token, &client, &user).await;
    assert!(
        dup.as_ref().is_err_and(|e| e.is_duplicate_key()),
        "saving the same access token twice should fail with a duplicate key error"
    );

    // Revoking the refresh token removes it.
    let revoked = model.revoke_token(&refresh).await?;
    assert_eq!(revoked.refresh_token, "xyz");
    assert_eq!(revoked.refresh_token_expires_at, Some(revoked_at()));
    assert!(model.get_refresh_token("xyz").await?.is_none());
    assert!(store.find_refresh_token("xyz").await?.is_none());

    // Revoking an already-removed token still hands back an expired copy.
    let again = model.revoke_token(&refresh).await?;
    assert_eq!(again.refresh_token_expires_at, Some(revoked_at()));

    // Client-credentials style token: no refresh component.
    let cc_token = NewToken {
        access_token: "cc-only".to_string(),
        access_token_expires_at: Some(expires),
        scope: Some("read".to_string()),
        ..Default::default()
    };
    let owner = model
        .get_user_from_client(&client)
        .await?
        .ok_or("client should have an owning user")?;
    assert_eq!(owner, user);
    let saved = model.save_token(&cc_token, &client, &owner).await?;
    assert!(saved.refresh_token.is_none());
    assert!(store.find_access_token("cc-only").await?.is_some());

    // Authorization code roundtrip and revocation.
    let new_code = NewAuthorizationCode {
        authorization_code: "code-1".to_string(),
        expires_at: Some(Utc::now() + Duration::minutes(10)),
        redirect_uri: Some("http://localhost/cb".to_string()),
        scope: Some("read".to_string()),
    };
    let saved_code = model
        .save_authorization_code(&new_code, &client, &user)
        .await?;
    assert_eq!(saved_code.code, "code-1");

    let code = model
        .get_authorization_code("code-1")
        .await?
        .ok_or("authorization code should resolve")?;
    assert_eq!(code.client, client);
    assert_eq!(code.user, user);
    assert_eq!(code.redirect_uri.as_deref(), Some("http://localhost/cb"));
    assert!(!code.is_expired());

    let revoked_code = model.revoke_authorization_code(&code).await?;
    assert_eq!(revoked_code.expires_at, Some(revoked_at()));

    let expired = model
        .get_authorization_code("code-1")
        .await?
        .ok_or("revoked code is kept, only expired")?;
    assert_eq!(expired.expires_at, Some(revoked_at()));
    assert!(expired.is_expired());

    assert!(model.get_authorization_code("code-unknown").await?.is_none());

    Ok(())
}
