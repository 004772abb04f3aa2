//! Bulk re-hosting of product images into the bucket.
//!
//! Every product image whose URL is not already in the bucket is fetched,
//! stored, and rewritten in place. Each image is attempted on its own; a
//! failure is recorded in the report and the run carries on.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;

use atelier_core::ProductId;

use super::storage::StorageClient;
use crate::db::{ProductRepository, RepositoryError};
use crate::db::products::ProductImages;

/// Images fetched and stored concurrently.
const CONCURRENCY: usize = 4;

/// One image moved into the bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigratedImage {
    pub product_id: ProductId,
    pub from: String,
    pub to: String,
}

/// One image that could not be moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedImage {
    pub product_id: ProductId,
    pub url: String,
    pub error: String,
}

/// Outcome of a migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub migrated: Vec<MigratedImage>,
    /// Images already in the bucket.
    pub skipped: usize,
    pub failed: Vec<FailedImage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Job {
    product_id: ProductId,
    url: String,
}

/// Split images into work to do and the count already hosted.
fn plan(products: Vec<ProductImages>, is_hosted: impl Fn(&str) -> bool) -> (Vec<Job>, usize) {
    let mut jobs = Vec::new();
    let mut skipped = 0;
    for product in products {
        for image in product.images {
            if is_hosted(&image.url) {
                skipped += 1;
            } else if !jobs
                .iter()
                .any(|j: &Job| j.product_id == product.id && j.url == image.url)
            {
                jobs.push(Job {
                    product_id: product.id.clone(),
                    url: image.url,
                });
            }
        }
    }
    (jobs, skipped)
}

/// Re-host every product image not already in the bucket.
///
/// # Errors
///
/// Returns `RepositoryError` only if the product images cannot be listed.
/// Per-image failures are reported in [`MigrationReport::failed`].
#[instrument(skip_all)]
pub async fn migrate_images(
    pool: &PgPool,
    storage: &StorageClient,
) -> Result<MigrationReport, RepositoryError> {
    let products = ProductRepository::new(pool);
    let (jobs, skipped) = plan(products.all_images().await?, |url| storage.is_hosted(url));
    tracing::info!(pending = jobs.len(), skipped, "starting image migration");

    let outcomes: Vec<(Job, Result<String, String>)> = stream::iter(jobs)
        .map(|job| async move {
            let stored = match storage.fetch(&job.url).await {
                Ok(upload) => storage.upload(upload).await,
                Err(e) => Err(e),
            };
            (job, stored.map_err(|e| e.to_string()))
        })
        .buffer_unordered(CONCURRENCY)
        .collect()
        .await;

    let mut report = MigrationReport {
        skipped,
        ..MigrationReport::default()
    };
    for (job, stored) in outcomes {
        let result = match stored {
            Ok(to) => products
                .replace_image_url(&job.product_id, &job.url, &to)
                .await
                .map(|_| to)
                .map_err(|e| e.to_string()),
            Err(e) => Err(e),
        };
        match result {
            Ok(to) => report.migrated.push(MigratedImage {
                product_id: job.product_id,
                from: job.url,
                to,
            }),
            Err(error) => {
                tracing::warn!(product_id = %job.product_id, url = %job.url, error = %error, "image migration failed");
                report.failed.push(FailedImage {
                    product_id: job.product_id,
                    url: job.url,
                    error,
                });
            }
        }
    }

    tracing::info!(
        migrated = report.migrated.len(),
        failed = report.failed.len(),
        skipped = report.skipped,
        "image migration finished"
    );
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use atelier_core::catalog::ProductImage;

    use super::*;

    fn image(url: &str) -> ProductImage {
        ProductImage {
            url: url.to_owned(),
            primary: false,
            hint: None,
        }
    }

    #[test]
    fn test_plan_skips_hosted_and_duplicate_images() {
        let products = vec![
            ProductImages {
                id: ProductId::new("p1"),
                images: vec![
                    image("https://bucket.test/uploads/a.jpg"),
                    image("https://cdn.old.test/b.jpg"),
                    image("https://cdn.old.test/b.jpg"),
                ],
            },
            ProductImages {
                id: ProductId::new("p2"),
                images: vec![image("https://cdn.old.test/b.jpg")],
            },
        ];
        let (jobs, skipped) = plan(products, |url| url.starts_with("https://bucket.test/"));
        assert_eq!(skipped, 1);
        assert_eq!(
            jobs,
            vec![
                Job {
                    product_id: ProductId::new("p1"),
                    url: "https://cdn.old.test/b.jpg".to_owned()
                },
                Job {
                    product_id: ProductId::new("p2"),
                    url: "https://cdn.old.test/b.jpg".to_owned()
                },
            ]
        );
    }

    #[test]
    fn test_report_serialises_camel_case() {
        let report = MigrationReport {
            migrated: Vec::new(),
            skipped: 2,
            failed: vec![FailedImage {
                product_id: ProductId::new("p1"),
                url: "http://cdn.old.test/x.jpg".to_owned(),
                error: "source unavailable: URL must use https".to_owned(),
            }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["skipped"], 2);
        assert_eq!(json["failed"][0]["productId"], "p1");
    }
}
