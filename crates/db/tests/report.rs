use std::io::Write;

use carsales_core::records::{CleanRecord, RawRecord};
use carsales_db::{BatchLoader, QualityReporter};
use sqlx::PgPool;
use tempfile::NamedTempFile;

fn source_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"model,year,price\n").unwrap();
    file
}

fn raw(model: &str, price: i32) -> RawRecord {
    RawRecord {
        model: Some(model.to_string()),
        year: Some(2017),
        price: Some(price),
        transmission: None,
        mileage: None,
        fuel_type: None,
        tax: None,
        mpg: None,
        engine_size: None,
    }
}

fn clean(model: &str, year: i32, price: i32) -> CleanRecord {
    CleanRecord {
        model: model.to_string(),
        year,
        price,
        transmission: "manual".to_string(),
        mileage: 5_000,
        fuel_type: "petrol".to_string(),
        tax: 150,
        mpg: 48.7,
        engine_size: 1.5,
    }
}

#[sqlx::test(migrations = false)]
async fn empty_tables_produce_zero_report(pool: PgPool) {
    BatchLoader::new(pool.clone()).ensure_schema().await.unwrap();

    let report = QualityReporter::new(pool).report().await.unwrap();
    assert_eq!(report.raw_count, 0);
    assert_eq!(report.clean_count, 0);
    assert_eq!(report.dropped, 0);
    assert_eq!(report.drop_rate, 0.0);
    assert_eq!(report.unique_model_count, 0);
    assert_eq!(report.price.min, None);
    assert_eq!(report.price.max, None);
    assert_eq!(report.price.avg, 0.0);
    assert_eq!(report.price.median, 0.0);
    assert_eq!(report.year_range.oldest, None);
}

#[sqlx::test(migrations = false)]
async fn report_summarises_both_tables(pool: PgPool) {
    let loader = BatchLoader::new(pool.clone());
    loader.ensure_schema().await.unwrap();
    let file = source_file();
    let src = file.path().to_string_lossy().into_owned();

    let raw_rows: Vec<_> = (0..8).map(|i| raw(" X3", 10_000 + i)).collect();
    loader.load_raw(&raw_rows, &src, true).await.unwrap();
    loader
        .load_clean(
            &[
                clean("x3", 2015, 10_000),
                clean("x3", 2016, 15_000),
                clean("x5", 2017, 20_000),
                clean("x5", 2018, 25_000),
                clean("m4", 2019, 30_000),
                clean("m4", 2020, 10_000),
            ],
            &src,
            true,
        )
        .await
        .unwrap();

    let report = QualityReporter::new(pool).report().await.unwrap();
    assert_eq!(report.raw_count, 8);
    assert_eq!(report.clean_count, 6);
    assert_eq!(report.dropped, 2);
    assert_eq!(report.drop_rate, 25.0);
    assert_eq!(report.unique_model_count, 3);
    assert_eq!(report.price.min, Some(10_000));
    assert_eq!(report.price.max, Some(30_000));
    assert_eq!(report.price.avg, 18_333.33);
    assert_eq!(report.price.median, 17_500.0);
    assert_eq!(report.year_range.oldest, Some(2015));
    assert_eq!(report.year_range.newest, Some(2020));
}
