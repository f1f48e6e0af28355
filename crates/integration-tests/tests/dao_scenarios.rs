//! DAO scenarios across the whole stack: config-free in-memory pool,
//! migrations, and every SQLite DAO wired the way the CLI wires them.

use chrono::{NaiveDate, NaiveDateTime};
use daokit_core::domain::{
    Account, Company, Employee, EmployeeProfile, Gender, Photo, PhotoComment, Product,
};
use daokit_core::port::{
    AccountDao, CompanyDao, CrudDao, EmployeeDao, EmployeeProfileDao, FixedTimeProvider, PhotoDao,
    ProductDao, TimeProvider,
};
use daokit_infra_sqlite::{
    create_memory_pool, run_migrations, SqliteAccountDao, SqliteCompanyDao, SqliteEmployeeDao,
    SqliteEmployeeProfileDao, SqlitePhotoDao, SqliteProductDao,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

struct Store {
    products: SqliteProductDao,
    accounts: SqliteAccountDao,
    companies: SqliteCompanyDao,
    photos: SqlitePhotoDao,
    employees: SqliteEmployeeDao,
    profiles: SqliteEmployeeProfileDao,
}

fn save_moment() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

async fn open_store() -> Store {
    let pool = create_memory_pool().await.unwrap();
    run_migrations(&pool).await.unwrap();
    let clock: Arc<dyn TimeProvider> = Arc::new(FixedTimeProvider(save_moment()));

    Store {
        products: SqliteProductDao::new(pool.clone(), clock.clone()),
        accounts: SqliteAccountDao::new(pool.clone(), clock.clone()),
        companies: SqliteCompanyDao::new(pool.clone()),
        photos: SqlitePhotoDao::new(pool.clone(), clock),
        employees: SqliteEmployeeDao::new(pool.clone()),
        profiles: SqliteEmployeeProfileDao::new(pool),
    }
}

fn milk() -> Product {
    Product::new(
        "Milk",
        "Acme",
        Decimal::from_str("1.50").unwrap(),
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
    )
}

#[tokio::test]
async fn test_milk_scenario() {
    let store = open_store().await;
    let mut product = milk();

    store.products.save(&mut product).await.unwrap();

    let id = product.id.unwrap();
    assert!(id > 0);

    let found = store.products.find_one(id).await.unwrap();
    assert_eq!(found.name, "Milk");
    assert_eq!(found.producer, "Acme");
    assert_eq!(found.price, Decimal::from_str("1.50").unwrap());
    assert_eq!(found.expiration_date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    assert_eq!(found.creation_time, Some(save_moment()));
    assert_eq!(found, product);
}

#[tokio::test]
async fn test_find_by_missing_email() {
    let store = open_store().await;

    let err = store.accounts.find_by_email("missing@x.com").await.unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_find_one_of_unknown_id_is_not_found() {
    let store = open_store().await;

    assert!(store.products.find_one(404).await.unwrap_err().is_not_found());
    assert!(store.accounts.find_one(404).await.unwrap_err().is_not_found());
    assert!(store.companies.find_one(404).await.unwrap_err().is_not_found());
    assert!(store.photos.find_one(404).await.unwrap_err().is_not_found());
    assert!(store.employees.find_one(404).await.unwrap_err().is_not_found());
    assert!(store.profiles.find_one(404).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_transient_entities_rejected_by_update_and_remove() {
    let store = open_store().await;

    let product = milk();
    assert!(store.products.update(&product).await.unwrap_err().is_missing_id());
    assert!(store.products.remove(&product).await.unwrap_err().is_missing_id());

    let account = Account::new(
        "Ada",
        "Lovelace",
        "ada@x.com",
        NaiveDate::from_ymd_opt(1815, 12, 10).unwrap(),
        Gender::Female,
    );
    assert!(store.accounts.update(&account).await.unwrap_err().is_missing_id());
    assert!(store.accounts.remove(&account).await.unwrap_err().is_missing_id());

    let company = Company::new("Acme");
    assert!(store.companies.update(&company).await.unwrap_err().is_missing_id());
    assert!(store.companies.remove(&company).await.unwrap_err().is_missing_id());

    let photo = Photo::new("https://img.example/cat.png");
    assert!(store.photos.update(&photo).await.unwrap_err().is_missing_id());
    assert!(store.photos.remove(&photo).await.unwrap_err().is_missing_id());

    let employee = Employee::new("Alan", "Turing");
    assert!(store.employees.update(&employee).await.unwrap_err().is_missing_id());
    assert!(store.employees.remove(&employee).await.unwrap_err().is_missing_id());

    let profile = EmployeeProfile::new("Engineer", "R&D");
    assert!(store.profiles.update(&profile).await.unwrap_err().is_missing_id());
    assert!(store.profiles.remove(&profile).await.unwrap_err().is_missing_id());

    // Nothing reached the store
    assert!(store.products.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_orphan_comment_is_deleted() {
    let store = open_store().await;
    let mut photo = Photo::new("https://img.example/sunset.png");
    photo.add_comment(PhotoComment::new("Beautiful"));
    photo.add_comment(PhotoComment::new("Too orange"));
    store.photos.save(&mut photo).await.unwrap();

    let orphan = photo.comments()[1].clone();
    let orphan_id = orphan.id.unwrap();
    assert!(photo.remove_comment(&orphan).is_some());
    store.photos.update(&photo).await.unwrap();

    assert!(store.photos.find_comment(orphan_id).await.unwrap_err().is_not_found());
    let reloaded = store.photos.find_one(photo.id.unwrap()).await.unwrap();
    assert_eq!(reloaded.comments().len(), 1);
    assert_eq!(reloaded.comments()[0].text, "Beautiful");
}

#[tokio::test]
async fn test_company_products_and_lazy_reference() {
    let store = open_store().await;
    let mut acme = Company::new("Acme");
    store.companies.save(&mut acme).await.unwrap();
    let mut product = milk().with_company(acme.id.unwrap());
    store.products.save(&mut product).await.unwrap();

    // Plain load only carries the reference
    let plain = store.products.find_one(product.id.unwrap()).await.unwrap();
    assert_eq!(plain.company_id, acme.id);

    let eager = store
        .products
        .find_one_fetch_company(product.id.unwrap())
        .await
        .unwrap();
    assert_eq!(eager.company, Some(acme.clone()));

    let with_products = store
        .companies
        .find_by_id_fetch_products(acme.id.unwrap())
        .await
        .unwrap();
    assert_eq!(with_products.products, vec![product]);
}

#[tokio::test]
async fn test_employee_profile_shares_id() {
    let store = open_store().await;
    let mut employee = Employee::new("Margaret", "Hamilton");
    store.employees.save(&mut employee).await.unwrap();
    let mut profile = EmployeeProfile::new("Director", "Software Engineering");
    store.profiles.save(&employee, &mut profile).await.unwrap();

    assert_eq!(profile.id, employee.id);

    let loaded = store
        .employees
        .find_by_id_fetch_profile(employee.id.unwrap())
        .await
        .unwrap();
    assert_eq!(loaded.profile, Some(profile));

    store.employees.remove(&employee).await.unwrap();
    assert!(store
        .profiles
        .find_one(employee.id.unwrap())
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_remove_absent_row_is_noop() {
    let store = open_store().await;
    let mut product = milk();
    store.products.save(&mut product).await.unwrap();

    store.products.remove(&product).await.unwrap();
    store.products.remove(&product).await.unwrap();

    assert!(store.products.find_all().await.unwrap().is_empty());
}
