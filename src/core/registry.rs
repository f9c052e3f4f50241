//! # Service Registry
//!
//! 리포지토리와 서비스를 타입별 싱글톤으로 보관하는 전역 레지스트리입니다.
//!
//! ## 등록 방식
//!
//! - **인프라 컴포넌트**: `Database`, `CacheLayer`처럼 비동기 연결이 필요한 값은
//!   `main`에서 직접 만든 뒤 [`ServiceLocator::set`]으로 넣습니다.
//! - **리포지토리/서비스**: `#[repository]` / `#[service]` 매크로(`singleton_macro`)가
//!   생성자를 `inventory`로 제출하고, [`ServiceLocator::get`]이 처음 호출될 때
//!   지연 생성됩니다. `Arc<T>` 필드는 같은 방식으로 주입됩니다.
//!
//! ## 이름 규칙
//!
//! 타입 이름에서 접미사를 떼고 소문자로 바꾼 값이 등록 이름과 일치해야 합니다.
//!
//! ```text
//! UserRepository  ↔  "user" / "user_repository"
//! UserService     ↔  "user" / "user_service"
//! GoogleAuthService ↔ "google_auth"
//! ```
//!
//! ## 등록 예제
//!
//! ```rust,ignore
//! #[service(name = "cache")]
//! pub struct CacheService {
//!     cache_layer: Arc<CacheLayer>,
//! }
//!
//! #[repository(name = "user", collection = "users")]
//! pub struct UserRepository {
//!     db: Arc<Database>,
//! }
//! ```
//!
//! 주입되는 필드는 모두 `Arc<T>`여야 합니다. 순환 의존은 패닉으로 드러납니다.

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use thiserror::Error;
use crate::utils::display_terminal::{print_boxed_title, print_cache_initialized, print_final_summary, print_step_complete, print_step_start, print_sub_task};

/// `#[service]` 매크로가 구현하는 서비스 메타데이터
#[async_trait]
pub trait Service: Send + Sync {
    fn name(&self) -> &str;

    async fn init(&self) -> Result<(), Box<dyn std::error::Error>>;
}

/// `#[repository]` 매크로가 구현하는 리포지토리 메타데이터
#[async_trait]
pub trait Repository: Send + Sync {
    fn name(&self) -> &str;

    /// 연결된 MongoDB 컬렉션 이름
    fn collection_name(&self) -> &str;

    async fn init(&self) -> Result<(), Box<dyn std::error::Error>>;
}

/// 서비스 등록 정보
pub struct ServiceRegistration {
    pub name: &'static str,
    pub constructor: fn() -> Box<dyn Any + Send + Sync>,
}

/// 리포지토리 등록 정보
pub struct RepositoryRegistration {
    pub name: &'static str,
    pub constructor: fn() -> Box<dyn Any + Send + Sync>,
}

inventory::collect!(ServiceRegistration);
inventory::collect!(RepositoryRegistration);

/// 레지스트리 조회 실패
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("등록되지 않은 컴포넌트: {0}")]
    NotRegistered(String),

    #[error("순환 의존성 감지: {0}")]
    CircularDependency(String),

    #[error("생성자 반환 타입 불일치: {0}")]
    TypeMismatch(String),
}

static SERVICE_NAME_CACHE: Lazy<HashMap<String, &'static ServiceRegistration>> = Lazy::new(|| {
    let cache: HashMap<_, _> = inventory::iter::<ServiceRegistration>()
        .map(|registration| (registration_key(registration.name), registration))
        .collect();
    print_cache_initialized("Service", cache.len());
    cache
});

static REPOSITORY_NAME_CACHE: Lazy<HashMap<String, &'static RepositoryRegistration>> = Lazy::new(|| {
    let cache: HashMap<_, _> = inventory::iter::<RepositoryRegistration>()
        .map(|registration| (registration_key(registration.name), registration))
        .collect();
    print_cache_initialized("Repository", cache.len());
    cache
});

/// 등록 이름에서 조회 키를 만듭니다. (`user_service` → `user`)
fn registration_key(name: &str) -> String {
    name.strip_suffix("_service")
        .or_else(|| name.strip_suffix("_repository"))
        .unwrap_or(name)
        .replace('_', "")
        .to_lowercase()
}

/// 타입 경로에서 마지막 세그먼트만 남깁니다.
fn short_type_name(type_name: &str) -> &str {
    type_name.rsplit("::").next().unwrap_or(type_name)
}

/// 타입 이름에서 (종류, 조회 키)를 추출합니다. (`UserService` → `("Service", "user")`)
fn lookup_key(type_name: &str) -> Option<(&'static str, String)> {
    let short = short_type_name(type_name);
    ["Repository", "Service"].into_iter().find_map(|suffix| {
        short
            .strip_suffix(suffix)
            .map(|entity| (suffix, entity.to_lowercase()))
    })
}

/// 전역 싱글톤 컨테이너
pub struct ServiceLocator {
    instances: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
    initializing: RwLock<HashSet<TypeId>>,
}

static LOCATOR: Lazy<ServiceLocator> = Lazy::new(ServiceLocator::new);

impl ServiceLocator {
    fn new() -> Self {
        Self {
            instances: RwLock::new(HashMap::new()),
            initializing: RwLock::new(HashSet::new()),
        }
    }

    fn instances(&self) -> RwLockReadGuard<'_, HashMap<TypeId, Arc<dyn Any + Send + Sync>>> {
        self.instances.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn instances_mut(&self) -> RwLockWriteGuard<'_, HashMap<TypeId, Arc<dyn Any + Send + Sync>>> {
        self.instances.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn initializing_mut(&self) -> RwLockWriteGuard<'_, HashSet<TypeId>> {
        self.initializing.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn cached<T: 'static + Send + Sync>() -> Option<Arc<T>> {
        LOCATOR
            .instances()
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|instance| instance.downcast::<T>().ok())
    }

    /// 타입 `T`의 싱글톤을 반환합니다. 없으면 등록된 생성자로 만듭니다.
    ///
    /// # Panics
    ///
    /// 등록되지 않았거나 순환 의존이 있으면 패닉합니다. 부팅 단계의 배선 오류이므로
    /// 복구 대상이 아닙니다.
    pub fn get<T: 'static + Send + Sync>() -> Arc<T> {
        match Self::try_get::<T>() {
            Ok(instance) => instance,
            Err(e) => {
                log::error!("❌ ServiceLocator: {}", e);
                panic!("ServiceLocator: {}", e);
            }
        }
    }

    /// [`ServiceLocator::get`]의 실패를 값으로 돌려주는 버전
    pub fn try_get<T: 'static + Send + Sync>() -> Result<Arc<T>, RegistryError> {
        let type_id = TypeId::of::<T>();
        let type_name = std::any::type_name::<T>();

        if let Some(instance) = Self::cached::<T>() {
            return Ok(instance);
        }

        if !LOCATOR.initializing_mut().insert(type_id) {
            return Err(RegistryError::CircularDependency(type_name.to_string()));
        }

        // 생성자는 잠금 밖에서 실행 (내부에서 다른 의존성을 get 할 수 있음)
        let result = Self::construct::<T>(type_name);
        LOCATOR.initializing_mut().remove(&type_id);
        let instance = result?;

        let mut instances = LOCATOR.instances_mut();
        let stored = instances
            .entry(type_id)
            .or_insert_with(|| instance.clone() as Arc<dyn Any + Send + Sync>)
            .clone();

        stored
            .downcast::<T>()
            .map_err(|_| RegistryError::TypeMismatch(type_name.to_string()))
    }

    fn construct<T: 'static + Send + Sync>(type_name: &str) -> Result<Arc<T>, RegistryError> {
        let not_registered = || RegistryError::NotRegistered(type_name.to_string());
        let (kind, key) = lookup_key(type_name).ok_or_else(not_registered)?;

        let boxed = match kind {
            "Repository" => REPOSITORY_NAME_CACHE.get(&key).map(|r| (r.constructor)()),
            _ => SERVICE_NAME_CACHE.get(&key).map(|r| (r.constructor)()),
        }
        .ok_or_else(not_registered)?;

        boxed
            .downcast::<Arc<T>>()
            .map(|arc| *arc)
            .map_err(|_| RegistryError::TypeMismatch(type_name.to_string()))
    }

    /// 인스턴스를 직접 등록합니다. 같은 타입이 있으면 교체됩니다.
    pub fn set<T: 'static + Send + Sync>(instance: Arc<T>) {
        let type_name = std::any::type_name::<T>();
        println!("📦 Registering: {}", short_type_name(type_name));

        LOCATOR
            .instances_mut()
            .insert(TypeId::of::<T>(), instance as Arc<dyn Any + Send + Sync>);
    }

    /// 등록된 모든 리포지토리와 서비스를 미리 생성합니다.
    ///
    /// 부팅 시점에 배선 오류를 드러내기 위해 `main`에서 한 번 호출합니다.
    pub fn initialize_all() {
        print_boxed_title("🔄 INITIALIZING SERVICE REGISTRY");

        let repositories: Vec<_> = inventory::iter::<RepositoryRegistration>().collect();
        let repo_count = repositories.len();
        if repo_count > 0 {
            print_step_start(1, "Creating Repository instances");
            for registration in repositories {
                print_sub_task(registration.name, "Creating...");
                let _ = (registration.constructor)();
                print_sub_task(registration.name, "✓ Created");
            }
            print_step_complete(1, "Repository instances created", repo_count);
        }

        let services: Vec<_> = inventory::iter::<ServiceRegistration>().collect();
        let service_count = services.len();
        if service_count > 0 {
            print_step_start(2, "Creating Service instances");
            for registration in services {
                print_sub_task(registration.name, "Creating...");
                let _ = (registration.constructor)();
                print_sub_task(registration.name, "✓ Created");
            }
            print_step_complete(2, "Service instances created", service_count);
        }

        print_final_summary(repo_count, service_count);
    }
}
