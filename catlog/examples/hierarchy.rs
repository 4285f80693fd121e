use catlog::{Priority, logger_config};

fn main() {
    // root at INFO, the database layer is chattier
    let _guard = logger_config()
        .with_root_priority(Priority::Info)
        .with_priority("app.db", Priority::Debug)
        .with_log_file("/tmp/catlog_hierarchy.log")
        .unwrap()
        .init_global();

    let db = catlog::category("app.db");
    let pool = catlog::category("app.db.pool");
    let http = catlog::category("app.http");

    pool.debug(|| "pool inherits DEBUG from app.db");
    http.debug(|| "dropped, app.http inherits INFO from root");
    http.info(|| "listening on :8080");
    catlog::catlog!(db, Priority::Warn, "slow query took {}ms", 1250);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let worker = catlog::category(&format!("app.worker.{i}"));
                worker.notice(|| format!("worker {i} started"));
                log::warn!(target: "app::worker", "worker {i} reporting through the log facade");
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    for category in catlog::registry().categories() {
        log::info!(target: "app", "{category}");
    }
}
