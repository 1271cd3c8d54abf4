use chrono::Utc;
use farmstand_core::{
    models::{
        NewProduct, Product, ProductFilter, ProductListResponse, ProductStatus, ProductUpdate,
    },
    AppError,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::file_store::ProductFile;

/// Repository over the product file.
///
/// Every operation loads the whole file and, for writes, rewrites it. All of them hold
/// one shared lock so read-modify-write cycles inside this process never interleave.
#[derive(Clone)]
pub struct ProductRepository {
    file: ProductFile,
    lock: Arc<Mutex<()>>,
}

/// A deleted product and the images it referenced that no remaining product uses.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedProduct {
    pub product: Product,
    pub unreferenced_image_urls: Vec<String>,
}

/// Next id: one past the largest numeric id. Non-numeric ids are ignored.
fn next_id(products: &[Product]) -> Result<String, AppError> {
    let max = products
        .iter()
        .filter_map(|p| p.id.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    max.checked_add(1)
        .map(|id| id.to_string())
        .ok_or_else(|| AppError::Store(format!("product id space exhausted at {}", max)))
}

fn newest_first(products: &mut [Product]) {
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

impl ProductRepository {
    pub fn new(file: ProductFile) -> Self {
        Self {
            file,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// All products in store order
    #[tracing::instrument(skip(self), fields(db.table = "products", db.operation = "select"))]
    pub async fn list(&self) -> Result<Vec<Product>, AppError> {
        let _guard = self.lock.lock().await;
        self.file.load().await
    }

    #[tracing::instrument(skip(self), fields(db.table = "products", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: &str) -> Result<Option<Product>, AppError> {
        let _guard = self.lock.lock().await;
        let products = self.file.load().await?;
        Ok(products.into_iter().find(|p| p.id == id))
    }

    /// Admin view: every product, optionally of one status, newest first
    #[tracing::instrument(skip(self), fields(db.table = "products", db.operation = "select"))]
    pub async fn list_admin(
        &self,
        status: Option<ProductStatus>,
    ) -> Result<Vec<Product>, AppError> {
        let _guard = self.lock.lock().await;
        let mut products: Vec<Product> = self
            .file
            .load()
            .await?
            .into_iter()
            .filter(|p| status.is_none_or(|s| p.status == s))
            .collect();
        newest_first(&mut products);
        Ok(products)
    }

    /// Public listing: approved products matching the filter, newest first, one page.
    ///
    /// The tag set and price ceiling are computed over all approved products, not just
    /// the filtered ones.
    #[tracing::instrument(skip(self, filter), fields(db.table = "products", db.operation = "select"))]
    pub async fn query_approved(
        &self,
        filter: &ProductFilter,
    ) -> Result<ProductListResponse, AppError> {
        let _guard = self.lock.lock().await;
        let approved: Vec<Product> = self
            .file
            .load()
            .await?
            .into_iter()
            .filter(Product::is_public)
            .collect();

        let mut tags: Vec<String> = Vec::new();
        for tag in approved.iter().flat_map(|p| p.tags.iter()) {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
        let max_price = approved
            .iter()
            .map(|p| p.price)
            .fold(0.0_f64, f64::max)
            .ceil();

        let mut matching: Vec<Product> = approved
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect();
        newest_first(&mut matching);

        let total = matching.len();
        let products: Vec<Product> = matching
            .into_iter()
            .skip(filter.offset())
            .take(filter.per_page)
            .collect();

        tracing::debug!(
            total = total,
            returned = products.len(),
            page = filter.page,
            "Approved products queried"
        );

        Ok(ProductListResponse {
            products,
            total,
            page: filter.page,
            per_page: filter.per_page,
            total_pages: filter.total_pages(total),
            tags,
            max_price,
        })
    }

    /// Append a new pending product with a fresh id
    #[tracing::instrument(skip(self, new_product), fields(db.table = "products", db.operation = "insert"))]
    pub async fn insert(&self, new_product: NewProduct) -> Result<Product, AppError> {
        let _guard = self.lock.lock().await;
        let mut products = self.file.load().await?;

        let product = new_product.into_product(next_id(&products)?, Utc::now());
        products.push(product.clone());
        self.file.save_all(&products).await?;

        tracing::info!(product_id = %product.id, count = products.len(), "Product inserted");
        Ok(product)
    }

    /// Change only the status. Returns None when the id is unknown.
    #[tracing::instrument(skip(self), fields(db.table = "products", db.operation = "update", db.record_id = %id))]
    pub async fn set_status(
        &self,
        id: &str,
        status: ProductStatus,
    ) -> Result<Option<Product>, AppError> {
        let _guard = self.lock.lock().await;
        let mut products = self.file.load().await?;

        let Some(product) = products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        product.status = status;
        let updated = product.clone();

        self.file.save_all(&products).await?;
        tracing::info!(product_id = %id, status = %status, "Product status changed");
        Ok(Some(updated))
    }

    /// Apply a partial update. Returns None when the id is unknown.
    #[tracing::instrument(skip(self, update), fields(db.table = "products", db.operation = "update", db.record_id = %id))]
    pub async fn update(
        &self,
        id: &str,
        update: ProductUpdate,
    ) -> Result<Option<Product>, AppError> {
        let _guard = self.lock.lock().await;
        let mut products = self.file.load().await?;

        let Some(product) = products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        product.apply(update);
        let updated = product.clone();

        self.file.save_all(&products).await?;
        tracing::info!(product_id = %id, "Product updated");
        Ok(Some(updated))
    }

    /// Remove a product and return it with the image URLs that are now unreferenced.
    /// Returns None when the id is unknown.
    #[tracing::instrument(skip(self), fields(db.table = "products", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: &str) -> Result<Option<RemovedProduct>, AppError> {
        let _guard = self.lock.lock().await;
        let mut products = self.file.load().await?;

        let Some(index) = products.iter().position(|p| p.id == id) else {
            return Ok(None);
        };
        let removed = products.remove(index);

        self.file.save_all(&products).await?;

        let still_used: HashSet<&str> = products
            .iter()
            .flat_map(|p| p.image_urls.iter().map(String::as_str))
            .collect();
        let mut unreferenced_image_urls: Vec<String> = Vec::new();
        for url in &removed.image_urls {
            if !still_used.contains(url.as_str()) && !unreferenced_image_urls.contains(url) {
                unreferenced_image_urls.push(url.clone());
            }
        }

        tracing::info!(
            product_id = %id,
            count = products.len(),
            shared_images = removed.image_urls.len() - unreferenced_image_urls.len(),
            "Product deleted"
        );
        Ok(Some(RemovedProduct {
            product: removed,
            unreferenced_image_urls,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::tempdir;

    fn new_product(name: &str, price: f64, tags: &[&str]) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price,
            description: "Grown on the farm".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            image_urls: vec!["/images/uploads/a.jpg".to_string()],
        }
    }

    fn repo(dir: &std::path::Path) -> ProductRepository {
        ProductRepository::new(ProductFile::new(dir.join("products.json")))
    }

    #[tokio::test]
    async fn test_first_insert_gets_id_one_and_pending() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());

        let product = repo
            .insert(new_product("Apples", 2.5, &["fruit"]))
            .await
            .unwrap();

        assert_eq!(product.id, "1");
        assert_eq!(product.status, ProductStatus::Pending);
        assert_eq!(repo.list().await.unwrap(), vec![product]);
    }

    #[tokio::test]
    async fn test_ids_stay_unique_after_delete() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());

        for name in ["Apples", "Pears", "Plums"] {
            repo.insert(new_product(name, 1.0, &["fruit"])).await.unwrap();
        }
        repo.delete("2").await.unwrap();
        let product = repo.insert(new_product("Figs", 1.0, &["fruit"])).await.unwrap();

        assert_eq!(product.id, "4");
        let ids: Vec<String> = repo.list().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["1", "3", "4"]);
    }

    #[test]
    fn test_next_id_ignores_non_numeric() {
        let mut product = new_product("Apples", 1.0, &["fruit"]).into_product("abc".into(), Utc::now());
        assert_eq!(next_id(std::slice::from_ref(&product)).unwrap(), "1");
        product.id = "41".to_string();
        assert_eq!(next_id(&[product]).unwrap(), "42");
    }

    #[tokio::test]
    async fn test_insert_fails_when_id_space_is_exhausted() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());
        let mut last = new_product("Apples", 1.0, &["fruit"]).into_product(u64::MAX.to_string(), Utc::now());
        last.status = ProductStatus::Approved;
        repo.file.save_all(&[last.clone()]).await.unwrap();

        let err = repo.insert(new_product("Pears", 1.0, &["fruit"])).await.unwrap_err();

        assert!(matches!(err, AppError::Store(_)));
        assert_eq!(repo.list().await.unwrap(), vec![last]);
    }

    #[tokio::test]
    async fn test_delete_keeps_images_other_products_still_use() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());
        let mut pears = new_product("Pears", 1.0, &["fruit"]);
        pears.image_urls = vec![
            "/images/uploads/a.jpg".to_string(),
            "/images/uploads/b.jpg".to_string(),
        ];
        repo.insert(new_product("Apples", 1.0, &["fruit"])).await.unwrap();
        repo.insert(pears).await.unwrap();

        let removed = repo.delete("2").await.unwrap().unwrap();

        assert_eq!(removed.product.name, "Pears");
        assert_eq!(removed.unreferenced_image_urls, vec!["/images/uploads/b.jpg"]);
        assert!(repo.get("2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_status_changes_only_status() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());
        let original = repo.insert(new_product("Apples", 2.5, &["fruit"])).await.unwrap();

        let approved = repo
            .set_status(&original.id, ProductStatus::Approved)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(approved.status, ProductStatus::Approved);
        assert_eq!(
            Product {
                status: ProductStatus::Pending,
                ..approved
            },
            original
        );
        assert!(repo
            .set_status("999", ProductStatus::Rejected)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_preserves_unmentioned_fields() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());
        let original = repo.insert(new_product("Apples", 2.5, &["fruit"])).await.unwrap();

        let updated = repo
            .update(
                &original.id,
                ProductUpdate {
                    description: Some("Crisp autumn apples".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.description, "Crisp autumn apples");
        assert_eq!(updated.image_urls, original.image_urls);
        assert_eq!(repo.get(&original.id).await.unwrap(), Some(updated));
        assert!(repo
            .update("999", ProductUpdate::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_unknown_is_none() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());
        assert!(repo.delete("1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_lists_only_approved_newest_first() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());

        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for (i, (name, price, tags)) in [
            ("Apples", 2.5, vec!["fruit"]),
            ("Carrots", 1.2, vec!["vegetable", "organic"]),
            ("Pears", 3.4, vec!["fruit", "organic"]),
        ]
        .into_iter()
        .enumerate()
        {
            let p = repo.insert(new_product(name, price, &tags)).await.unwrap();
            repo.update(
                &p.id,
                ProductUpdate {
                    created_at: Some(base + Duration::days(i as i64)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }
        repo.insert(new_product("Hidden Honey", 9.9, &["sweet"])).await.unwrap();
        repo.set_status("1", ProductStatus::Approved).await.unwrap();
        repo.set_status("2", ProductStatus::Approved).await.unwrap();
        repo.set_status("3", ProductStatus::Approved).await.unwrap();

        let page = repo.query_approved(&ProductFilter::default()).await.unwrap();
        let names: Vec<&str> = page.products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Pears", "Carrots", "Apples"]);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.tags, vec!["fruit", "vegetable", "organic"]);
        assert_eq!(page.max_price, 4.0);

        let organic = ProductFilter {
            tags: vec!["organic".to_string()],
            max_price: Some(2.0),
            ..Default::default()
        };
        let page = repo.query_approved(&organic).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.products[0].name, "Carrots");
        assert_eq!(page.tags.len(), 3);
    }

    #[tokio::test]
    async fn test_query_paginates() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());
        for i in 0..5 {
            let p = repo
                .insert(new_product(&format!("Item {}", i), 1.0, &["x"]))
                .await
                .unwrap();
            repo.set_status(&p.id, ProductStatus::Approved).await.unwrap();
        }

        let filter = ProductFilter {
            page: 3,
            per_page: 2,
            ..Default::default()
        };
        let page = repo.query_approved(&filter).await.unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.products.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_store_has_zero_price_ceiling() {
        let dir = tempdir().unwrap();
        let page = repo(dir.path())
            .query_approved(&ProductFilter::default())
            .await
            .unwrap();
        assert!(page.products.is_empty());
        assert_eq!(page.max_price, 0.0);
        assert_eq!(page.total_pages, 0);
    }

    #[tokio::test]
    async fn test_admin_list_filters_by_status() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());
        repo.insert(new_product("Apples", 1.0, &["fruit"])).await.unwrap();
        repo.insert(new_product("Pears", 1.0, &["fruit"])).await.unwrap();
        repo.set_status("2", ProductStatus::Rejected).await.unwrap();

        assert_eq!(repo.list_admin(None).await.unwrap().len(), 2);
        let pending = repo.list_admin(Some(ProductStatus::Pending)).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "1");
    }

    #[tokio::test]
    async fn test_concurrent_inserts_are_not_lost() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.insert(new_product(&format!("Item {}", i), 1.0, &["x"]))
                        .await
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let mut ids: Vec<u64> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id.parse().unwrap())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=20).collect::<Vec<u64>>());
    }
}
