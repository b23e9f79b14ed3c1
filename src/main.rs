use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use dental_catalog::{config::Config, controllers, AppState};
use dotenv::dotenv;
use log::{error, info};
use sqlx::postgres::PgPoolOptions;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
	if std::env::var_os("RUST_LOG").is_none() {
		std::env::set_var("RUST_LOG", "actix_web=info,dental_catalog=info");
	}
	dotenv().ok();
	env_logger::init();

	let config = Config::init();

	let pool = match PgPoolOptions::new()
		.max_connections(config.max_connections)
		.connect(&config.database_url)
		.await
	{
		Ok(pool) => {
			info!("✅Connection to the database is successful!");
			pool
		}
		Err(err) => {
			error!("🔥 Failed to connect to the database: {:?}", err);
			std::process::exit(1);
		}
	};

	info!("🚀 Server started successfully on {}:{}", config.host, config.port);

	let bind = (config.host.clone(), config.port);

	HttpServer::new(move || {
		App::new()
			.app_data(web::Data::new(AppState {
				db: pool.clone(),
				env: config.clone(),
			}))
			.configure(controllers::config)
			.wrap(Cors::permissive())
			.wrap(Logger::default())
	})
	.bind(bind)?
	.run()
	.await
}
