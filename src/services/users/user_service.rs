//! # 사용자 관리 서비스
//!
//! 가입, 로그인, 프로필 조회, 계정 활성화를 담당합니다.
//!
//! ```text
//! register ──▶ UserStore.insert (비활성) ──▶ [백그라운드] 코드 저장 → 메일 발송
//! activate ──▶ 코드 확인 ──▶ UserStore.mark_active ──▶ 코드 삭제, user:{username} 삭제
//! login    ──▶ UserStore.find_by_username (캐시 미사용) ──▶ bcrypt 검증
//! profile  ──▶ use_cache_with_ro("user:{username}") ──▶ 미스 시 UserStore
//! ```
//!
//! 프로필 캐시에는 비밀번호 해시가 없는 [`UserResponse`]만 저장됩니다.
//! 로그인은 항상 저장소를 직접 읽으므로 캐시가 오래된 값이어도 인증에는 영향이 없습니다.
//!
//! [`UserService`]는 레지스트리가 주입하는 싱글톤이고, 실제 흐름은 저장소와
//! 메일 발송기를 trait 객체로 받는 [`UserAccounts`]에 있습니다.

use std::sync::Arc;
use std::time::Duration;
use bcrypt::hash;
use mongodb::bson::oid::ObjectId;
use singleton_macro::service;
use crate::caching::{CacheLayer, use_cache_with_ro};
use crate::config::{CacheConfig, PasswordConfig};
use crate::domain::dto::users::{RegisterRequest, RegisterResponse, UserResponse};
use crate::domain::models::oauth::GoogleUserInfo;
use crate::domain::entities::users::user::User;
use crate::errors::errors::AppError;
use crate::repositories::otp::OtpRepository;
use crate::repositories::users::{UserRepository, UserStore};
use crate::services::mail::{ActivationMailer, ActivationMessage, LogMailer};
use crate::utils::otp::generate_otp;

/// 사용자 관리 서비스 싱글톤
#[service(name = "user")]
pub struct UserService {
    user_repo: Arc<UserRepository>,
    otp_repo: Arc<OtpRepository>,
    cache_layer: Arc<CacheLayer>,
    mailer: Arc<LogMailer>,
}

impl UserService {
    /// 주입된 의존성으로 만든 계정 흐름
    pub fn accounts(&self) -> UserAccounts {
        UserAccounts::with_dependencies(
            self.user_repo.clone(),
            self.otp_repo.clone(),
            self.cache_layer.clone(),
            self.mailer.clone(),
        )
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<RegisterResponse, AppError> {
        self.accounts().register(request).await
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AppError> {
        self.accounts().authenticate(username, password).await
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<UserResponse, AppError> {
        self.accounts().find_user_by_username(username).await
    }

    pub async fn activate(&self, user_id: &str, code: &str) -> Result<UserResponse, AppError> {
        self.accounts().activate(user_id, code).await
    }

    pub async fn find_or_create_by_email(&self, info: &GoogleUserInfo) -> Result<User, AppError> {
        self.accounts().find_or_create_by_email(info).await
    }
}

/// 가입, 로그인, 프로필 조회, 활성화 흐름
///
/// 모든 메서드는 `Result<T, AppError>`를 반환합니다.
///
/// - **ValidationError**: 활성화 코드 불일치/만료
/// - **ConflictError**: 이메일/사용자명 중복, 이미 활성화된 계정
/// - **AuthenticationError**: 로그인 실패, 비활성 계정
/// - **NotFound**: 사용자 없음
/// - **CacheError**: 캐시 저장소 장애 (프로필 조회)
pub struct UserAccounts {
    users: Arc<dyn UserStore>,
    otps: Arc<OtpRepository>,
    cache: Arc<CacheLayer>,
    mailer: Arc<dyn ActivationMailer>,
    password_cost: u32,
    profile_ttl: Duration,
}

impl UserAccounts {
    pub fn with_dependencies(
        users: Arc<dyn UserStore>,
        otps: Arc<OtpRepository>,
        cache: Arc<CacheLayer>,
        mailer: Arc<dyn ActivationMailer>,
    ) -> Self {
        Self {
            users,
            otps,
            cache,
            mailer,
            password_cost: PasswordConfig::bcrypt_cost(),
            profile_ttl: CacheConfig::user_cache_ttl(),
        }
    }

    /// 프로필 캐시 키
    pub fn profile_cache_key(username: &str) -> String {
        format!("user:{}", username)
    }

    /// 새 계정을 비활성 상태로 만들고 활성화 코드를 발송합니다.
    ///
    /// 코드 저장과 메일 발송은 백그라운드 태스크에서 실행되며,
    /// 실패해도 가입 응답에는 영향이 없습니다.
    pub async fn register(&self, request: RegisterRequest) -> Result<RegisterResponse, AppError> {
        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::ConflictError("이미 사용 중인 이메일입니다".to_string()));
        }
        if self.users.find_by_username(&request.username).await?.is_some() {
            return Err(AppError::ConflictError("이미 사용 중인 사용자명입니다".to_string()));
        }

        let hash_start = std::time::Instant::now();
        let password_hash = hash(&request.password, self.password_cost)
            .map_err(|e| AppError::InternalError(format!("비밀번호 해싱 실패: {}", e)))?;
        log::debug!("Password hashing took: {:?}", hash_start.elapsed());

        let user = User::new_local(
            request.email,
            request.username,
            request.first_name,
            request.last_name,
            password_hash,
        );
        let created = self.users.insert(user).await?;

        self.dispatch_activation_code(&created)?;
        log::info!("신규 가입 - username: {}", created.username);

        Ok(RegisterResponse {
            message: "가입이 완료되었습니다. 메일로 받은 활성화 코드를 입력해주세요".to_string(),
            user: UserResponse::from(created),
        })
    }

    fn dispatch_activation_code(&self, user: &User) -> Result<(), AppError> {
        let user_id = user
            .id_string()
            .ok_or_else(|| AppError::InternalError("사용자 ID가 없습니다".to_string()))?;
        let email = user.email.clone();
        let username = user.username.clone();
        let otps = Arc::clone(&self.otps);
        let mailer = Arc::clone(&self.mailer);

        tokio::spawn(async move {
            let code = generate_otp();

            if let Err(e) = otps.save_code(&user_id, &code).await {
                log::warn!("활성화 코드 저장 실패 - user_id: {}, error: {}", user_id, e);
                return;
            }

            let message = ActivationMessage::new(&email, &username, &code, otps.ttl());
            if let Err(e) = mailer.send(&message).await {
                log::warn!("활성화 메일 발송 실패 - user_id: {}, error: {}", user_id, e);
            }
        });

        Ok(())
    }

    /// 사용자명과 비밀번호로 인증합니다. 저장소를 직접 조회합니다.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AppError> {
        let invalid = || AppError::AuthenticationError("잘못된 사용자명 또는 비밀번호입니다".to_string());

        let user = self.users.find_by_username(username).await?.ok_or_else(invalid)?;
        if !user.has_password() {
            return Err(invalid());
        }

        let is_valid = bcrypt::verify(password, &user.password_hash)
            .map_err(|e| AppError::InternalError(format!("비밀번호 검증 실패: {}", e)))?;
        if !is_valid {
            log::debug!("로그인 실패 (비밀번호 불일치) - username: {}", username);
            return Err(invalid());
        }

        if !user.is_active {
            return Err(AppError::AuthenticationError("활성화되지 않은 계정입니다".to_string()));
        }

        Ok(user)
    }

    /// 사용자 프로필을 cache-aside로 조회합니다.
    ///
    /// 복제본 캐시 → (미스) 저장소 순으로 확인하고, 저장소에서 읽은 값은
    /// 기본 캐시에 비동기로 기록됩니다. 없는 사용자는 캐시하지 않습니다.
    pub async fn find_user_by_username(&self, username: &str) -> Result<UserResponse, AppError> {
        let key = Self::profile_cache_key(username);

        use_cache_with_ro(
            self.cache.read_only.as_ref(),
            &self.cache.primary,
            &key,
            self.profile_ttl,
            || async {
                self.users
                    .find_by_username(username)
                    .await?
                    .map(UserResponse::from)
                    .ok_or_else(|| AppError::NotFound(format!("사용자를 찾을 수 없습니다: {}", username)))
            },
        )
        .await
    }

    /// 활성화 코드를 확인하고 계정을 활성화합니다.
    ///
    /// 성공하면 코드를 지우고 기본 캐시의 프로필(`user:{username}`)을 무효화합니다.
    /// 복제본에는 TTL이 지날 때까지 이전 프로필이 남아 있을 수 있습니다.
    pub async fn activate(&self, user_id: &str, code: &str) -> Result<UserResponse, AppError> {
        let not_found = || AppError::NotFound(format!("사용자를 찾을 수 없습니다: {}", user_id));

        let object_id = ObjectId::parse_str(user_id).map_err(|_| not_found())?;
        let mut user = self.users.find_by_id(&object_id).await?.ok_or_else(not_found)?;

        if user.is_active {
            return Err(AppError::ConflictError("이미 활성화된 계정입니다".to_string()));
        }

        let stored = self
            .otps
            .find_code(user_id)
            .await?
            .ok_or_else(|| AppError::ValidationError("활성화 코드가 만료되었거나 존재하지 않습니다".to_string()))?;

        if stored != code {
            return Err(AppError::ValidationError("활성화 코드가 일치하지 않습니다".to_string()));
        }

        if !self.users.mark_active(&object_id).await? {
            return Err(AppError::ConflictError("이미 활성화된 계정입니다".to_string()));
        }

        if let Err(e) = self.otps.delete_code(user_id).await {
            log::warn!("활성화 코드 삭제 실패 - user_id: {}, error: {}", user_id, e);
        }

        self.invalidate_profile(&user.username).await;
        log::info!("계정 활성화 - username: {}", user.username);

        user.is_active = true;
        Ok(UserResponse::from(user))
    }

    /// Google 로그인 사용자를 이메일로 찾고, 없으면 활성 상태로 만듭니다.
    ///
    /// 새 계정의 사용자명은 이메일이고 비밀번호가 없습니다. 이메일은 Google이
    /// 확인했으므로 비활성 상태의 기존 계정은 이 시점에 활성화됩니다.
    pub async fn find_or_create_by_email(&self, info: &GoogleUserInfo) -> Result<User, AppError> {
        let email = info
            .email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .ok_or_else(|| AppError::ValidationError("Google 계정에 이메일이 없습니다".to_string()))?;

        if let Some(mut user) = self.users.find_by_email(email).await? {
            if !user.is_active {
                if let Some(id) = user.id {
                    self.users.mark_active(&id).await?;
                }
                self.invalidate_profile(&user.username).await;
                user.is_active = true;
                log::info!("Google 로그인으로 계정 활성화 - username: {}", user.username);
            }
            return Ok(user);
        }

        let user = User::new_oauth(email.to_string(), info.given_name.clone(), info.family_name.clone());
        let created = self.users.insert(user).await?;
        log::info!("Google 계정 신규 가입 - email: {}", created.email);
        Ok(created)
    }

    async fn invalidate_profile(&self, username: &str) {
        let key = Self::profile_cache_key(username);
        if let Err(e) = self.cache.primary.delete(&key).await {
            log::warn!("프로필 캐시 무효화 실패 - key: {}, error: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use async_trait::async_trait;
    use crate::caching::memory::MemoryCache;
    use crate::caching::{ReadOnlyCache, get_value};

    #[derive(Default)]
    struct InMemoryUserStore {
        users: Mutex<Vec<User>>,
        username_lookups: AtomicUsize,
    }

    impl InMemoryUserStore {
        fn lookups(&self) -> usize {
            self.username_lookups.load(Ordering::SeqCst)
        }

        fn rename(&self, from: &str, to: &str) {
            for user in self.users.lock().unwrap().iter_mut() {
                if user.username == from {
                    user.username = to.to_string();
                }
            }
        }
    }

    #[async_trait]
    impl UserStore for InMemoryUserStore {
        async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
            Ok(self.users.lock().unwrap().iter().find(|u| u.id.as_ref() == Some(id)).cloned())
        }

        async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
            self.username_lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.users.lock().unwrap().iter().find(|u| u.username == username).cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
            Ok(self.users.lock().unwrap().iter().find(|u| u.email == email).cloned())
        }

        async fn insert(&self, mut user: User) -> Result<User, AppError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.email == user.email || u.username == user.username) {
                return Err(AppError::ConflictError("duplicate".to_string()));
            }
            user.id = Some(ObjectId::new());
            users.push(user.clone());
            Ok(user)
        }

        async fn mark_active(&self, id: &ObjectId) -> Result<bool, AppError> {
            let mut users = self.users.lock().unwrap();
            match users.iter_mut().find(|u| u.id.as_ref() == Some(id) && !u.is_active) {
                Some(user) => {
                    user.is_active = true;
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<ActivationMessage>>,
    }

    #[async_trait]
    impl ActivationMailer for RecordingMailer {
        async fn send(&self, message: &ActivationMessage) -> Result<(), AppError> {
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    struct Fixture {
        service: UserAccounts,
        store: Arc<InMemoryUserStore>,
        cache: Arc<MemoryCache>,
        otps: Arc<OtpRepository>,
        mailer: Arc<RecordingMailer>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryUserStore::default());
        let cache = Arc::new(MemoryCache::new());
        let otps = Arc::new(OtpRepository::with_ttl(
            Arc::new(MemoryCache::new()),
            Duration::from_secs(300),
        ));
        let mailer = Arc::new(RecordingMailer::default());

        let mut service = UserAccounts::with_dependencies(
            store.clone(),
            otps.clone(),
            Arc::new(CacheLayer::single(cache.clone())),
            mailer.clone(),
        );
        service.password_cost = 4;
        service.profile_ttl = Duration::from_secs(300);

        Fixture { service, store, cache, otps, mailer }
    }

    fn register_request(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            username: username.to_string(),
            password: "secret1".to_string(),
            first_name: None,
            last_name: None,
        }
    }

    async fn wait_for_code(otps: &OtpRepository, user_id: &str) -> String {
        for _ in 0..200 {
            if let Some(code) = otps.find_code(user_id).await.unwrap() {
                return code;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("activation code was never stored");
    }

    async fn wait_for_key(cache: &MemoryCache, key: &str) {
        for _ in 0..200 {
            if cache.get_raw(key).await.unwrap().is_hit() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("{} was never populated", key);
    }

    #[tokio::test]
    async fn test_register_creates_inactive_user_and_sends_code() {
        let f = fixture();

        let response = f.service.register(register_request("alice", "alice@example.com")).await.unwrap();

        assert!(!response.user.is_active);
        let code = wait_for_code(&f.otps, &response.user.id).await;
        assert_eq!(code.len(), 6);

        for _ in 0..200 {
            if !f.mailer.sent.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let sent = f.mailer.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "alice@example.com");
        assert!(sent[0].body.contains(&code));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let f = fixture();
        f.service.register(register_request("alice", "alice@example.com")).await.unwrap();

        let same_email = f.service.register(register_request("alice2", "alice@example.com")).await;
        let same_username = f.service.register(register_request("alice", "other@example.com")).await;

        assert!(matches!(same_email, Err(AppError::ConflictError(_))));
        assert!(matches!(same_username, Err(AppError::ConflictError(_))));
    }

    #[tokio::test]
    async fn test_inactive_account_cannot_log_in_until_activated() {
        let f = fixture();
        let registered = f.service.register(register_request("alice", "alice@example.com")).await.unwrap();

        let before = f.service.authenticate("alice", "secret1").await;
        assert!(matches!(before, Err(AppError::AuthenticationError(_))));

        let code = wait_for_code(&f.otps, &registered.user.id).await;
        let activated = f.service.activate(&registered.user.id, &code).await.unwrap();
        assert!(activated.is_active);

        let user = f.service.authenticate("alice", "secret1").await.unwrap();
        assert_eq!(user.username, "alice");

        let wrong_password = f.service.authenticate("alice", "secret2").await;
        assert!(matches!(wrong_password, Err(AppError::AuthenticationError(_))));

        let unknown = f.service.authenticate("nobody", "secret1").await;
        assert!(matches!(unknown, Err(AppError::AuthenticationError(_))));
    }

    #[tokio::test]
    async fn test_activation_error_cases() {
        let f = fixture();
        let registered = f.service.register(register_request("alice", "alice@example.com")).await.unwrap();
        let user_id = registered.user.id.clone();
        let code = wait_for_code(&f.otps, &user_id).await;
        let wrong = if code == "000000" { "111111" } else { "000000" };

        assert!(matches!(
            f.service.activate(&user_id, wrong).await,
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            f.service.activate(&ObjectId::new().to_hex(), &code).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            f.service.activate("not-an-object-id", &code).await,
            Err(AppError::NotFound(_))
        ));

        f.service.activate(&user_id, &code).await.unwrap();
        assert_eq!(f.otps.find_code(&user_id).await.unwrap(), None);

        assert!(matches!(
            f.service.activate(&user_id, &code).await,
            Err(AppError::ConflictError(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_code_is_a_validation_error() {
        let f = fixture();
        let registered = f.service.register(register_request("alice", "alice@example.com")).await.unwrap();
        let user_id = registered.user.id.clone();
        wait_for_code(&f.otps, &user_id).await;
        f.otps.delete_code(&user_id).await.unwrap();

        let result = f.service.activate(&user_id, "123456").await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_profile_is_served_from_cache_on_second_read() {
        let f = fixture();
        f.service.register(register_request("alice", "alice@example.com")).await.unwrap();
        let lookups_after_register = f.store.lookups();

        let first = f.service.find_user_by_username("alice").await.unwrap();
        assert_eq!(f.store.lookups(), lookups_after_register + 1);
        wait_for_key(&f.cache, "user:alice").await;

        // 저장소가 바뀌어도 TTL 동안은 캐시된 값이 반환됨
        f.store.rename("alice", "alice_renamed");
        let second = f.service.find_user_by_username("alice").await.unwrap();

        assert_eq!(second, first);
        assert_eq!(f.store.lookups(), lookups_after_register + 1);
    }

    #[tokio::test]
    async fn test_unknown_profile_is_not_cached() {
        let f = fixture();

        let result = f.service.find_user_by_username("ghost").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(f.cache.get_raw("user:ghost").await.unwrap(), crate::caching::CacheLookup::Miss);
    }

    #[tokio::test]
    async fn test_activation_invalidates_cached_profile() {
        let f = fixture();
        let registered = f.service.register(register_request("alice", "alice@example.com")).await.unwrap();

        let cached = f.service.find_user_by_username("alice").await.unwrap();
        assert!(!cached.is_active);
        wait_for_key(&f.cache, "user:alice").await;

        let code = wait_for_code(&f.otps, &registered.user.id).await;
        f.service.activate(&registered.user.id, &code).await.unwrap();

        assert!(!f.cache.get_raw("user:alice").await.unwrap().is_hit());
        let fresh = f.service.find_user_by_username("alice").await.unwrap();
        assert!(fresh.is_active);
    }

    #[tokio::test]
    async fn test_profile_cache_payload_has_no_password_hash() {
        let f = fixture();
        f.service.register(register_request("alice", "alice@example.com")).await.unwrap();

        f.service.find_user_by_username("alice").await.unwrap();
        wait_for_key(&f.cache, "user:alice").await;

        let raw = f.cache.get_raw("user:alice").await.unwrap().into_option().unwrap();
        assert!(!raw.contains("password"));
        let decoded = get_value::<UserResponse, _>(f.cache.as_ref(), "user:alice").await.unwrap();
        assert!(decoded.is_hit());
    }

    fn google_info(email: Option<&str>) -> GoogleUserInfo {
        GoogleUserInfo {
            id: Some("1234567890".to_string()),
            email: email.map(str::to_string),
            verified_email: Some(true),
            name: Some("Alice Kim".to_string()),
            given_name: Some("Alice".to_string()),
            family_name: Some("Kim".to_string()),
            picture: None,
        }
    }

    #[tokio::test]
    async fn test_google_login_creates_active_user_named_by_email() {
        let f = fixture();

        let user = f.service.find_or_create_by_email(&google_info(Some("alice@gmail.com"))).await.unwrap();

        assert!(user.is_active);
        assert!(user.id.is_some());
        assert_eq!(user.username, "alice@gmail.com");
        assert_eq!(user.first_name.as_deref(), Some("Alice"));
        assert_eq!(user.last_name.as_deref(), Some("Kim"));

        let again = f.service.find_or_create_by_email(&google_info(Some("alice@gmail.com"))).await.unwrap();
        assert_eq!(again.id, user.id);
        assert_eq!(f.store.users.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_google_login_activates_pending_local_account() {
        let f = fixture();
        f.service.register(register_request("alice", "alice@example.com")).await.unwrap();
        let cached = f.service.find_user_by_username("alice").await.unwrap();
        assert!(!cached.is_active);
        wait_for_key(&f.cache, "user:alice").await;

        let user = f.service.find_or_create_by_email(&google_info(Some("alice@example.com"))).await.unwrap();

        assert!(user.is_active);
        assert_eq!(user.username, "alice");
        assert!(!f.cache.get_raw("user:alice").await.unwrap().is_hit());
        assert!(f.service.find_user_by_username("alice").await.unwrap().is_active);
    }

    #[tokio::test]
    async fn test_google_login_without_email_is_rejected() {
        let f = fixture();

        let missing = f.service.find_or_create_by_email(&google_info(None)).await;
        let blank = f.service.find_or_create_by_email(&google_info(Some("  "))).await;

        assert!(matches!(missing, Err(AppError::ValidationError(_))));
        assert!(matches!(blank, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_google_account_cannot_use_password_login() {
        let f = fixture();
        f.service.find_or_create_by_email(&google_info(Some("alice@gmail.com"))).await.unwrap();

        let result = f.service.authenticate("alice@gmail.com", "").await;

        assert!(matches!(result, Err(AppError::AuthenticationError(_))));
    }
}
