#[cfg(feature = "ssr")]
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    use mathmentor::components::app::*;
    use mathmentor::ssr::app_state::AppState;
    use mathmentor::ssr::config::ServerConfig;

    use actix_files::Files;
    use actix_web::*;
    use fred::prelude::ClientLike;
    use leptos::config::get_configuration;
    use leptos::prelude::*;
    use leptos_actix::{LeptosRoutes, generate_route_list};
    use leptos_meta::MetaTags;
    use lettre::{AsyncSmtpTransport, Tokio1Executor};
    use std::sync::Arc;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let conf = get_configuration(None).unwrap();
    let addr = conf.leptos_options.site_addr;

    let config = ServerConfig::from_env().expect("server configuration should be complete");

    let db_pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("database should open");
    sqlx::migrate!()
        .run(&db_pool)
        .await
        .expect("database migrations should apply");

    let valkey_config = fred::prelude::Config::from_url(&config.valkey_url)
        .expect("should be able to construct Valkey config");
    let valkey_pool = fred::prelude::Pool::new(valkey_config, None, None, None, 5)
        .expect("should be able to create Valkey pool");
    valkey_pool
        .init()
        .await
        .expect("should be able to initialize Valkey pool");

    let mailer = AsyncSmtpTransport::<Tokio1Executor>::from_url(&config.smtp_url)
        .expect("SMTP_URL should be a valid SMTP URL")
        .build();

    log::info!("Serving Math Mentor on http://{addr}");

    let app_state = AppState {
        db_pool,
        valkey_pool,
        mailer,
        config: Arc::new(config),
    };

    HttpServer::new(move || {
        // Generate the list of routes in your Leptos App
        let routes = generate_route_list(App);
        let leptos_options = &conf.leptos_options;
        let site_root = leptos_options.site_root.clone().to_string();
        let app_state = app_state.clone();

        App::new()
            // serve JS/WASM/CSS from `pkg`
            .service(Files::new("/pkg", format!("{site_root}/pkg")))
            // serve other assets from the `assets` directory
            .service(Files::new("/assets", &site_root))
            // serve the favicon from /favicon.ico
            .service(favicon)
            .leptos_routes_with_context(
                routes,
                move || {
                    let app_state = app_state.clone();
                    provide_context(app_state);
                },
                {
                    let leptos_options = leptos_options.clone();
                    move || {
                        view! {
                            <!DOCTYPE html>
                            <html lang="en">
                                <head>
                                    <meta charset="utf-8" />
                                    <meta
                                        name="viewport"
                                        content="width=device-width, initial-scale=1"
                                    />
                                    <AutoReload options=leptos_options.clone() />
                                    <HydrationScripts options=leptos_options.clone() />
                                    <MetaTags />
                                </head>
                                <body>
                                    <App />
                                </body>
                            </html>
                        }
                    }
                },
            )
            .app_data(web::Data::new(leptos_options.to_owned()))
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
    })
    .bind(&addr)?
    .run()
    .await
}

#[cfg(feature = "ssr")]
#[actix_web::get("favicon.ico")]
async fn favicon(
    leptos_options: actix_web::web::Data<leptos::config::LeptosOptions>,
) -> actix_web::Result<actix_files::NamedFile> {
    let leptos_options = leptos_options.into_inner();
    let site_root = &leptos_options.site_root;
    Ok(actix_files::NamedFile::open(format!(
        "{site_root}/favicon.ico"
    ))?)
}

#[cfg(not(any(feature = "ssr", feature = "csr")))]
pub fn main() {
    // no client-side main function
    // see lib.rs for hydration function instead
}

#[cfg(all(not(feature = "ssr"), feature = "csr"))]
pub fn main() {
    // to run: `trunk serve --open --features csr`
    use mathmentor::components::app::*;

    console_error_panic_hook::set_once();

    leptos::mount::mount_to_body(App);
}
