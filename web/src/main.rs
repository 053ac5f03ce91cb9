use dioxus::prelude::*;

use ui::Navbar;
use views::{CreateExercise, CreateUser, EditExercise, ExercisesList};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(Shell)]
    #[route("/")]
    ExercisesList {},
    #[route("/edit/:id")]
    EditExercise { id: String },
    #[route("/create")]
    CreateExercise {},
    #[route("/user")]
    CreateUser {},
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    #[cfg(feature = "server")]
    {
        tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(launch_server());
    }

    #[cfg(not(feature = "server"))]
    {
        dioxus::launch(App);
    }
}

#[cfg(feature = "server")]
async fn launch_server() {
    use dioxus::server::{DioxusRouterExt, ServeConfig};
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let router = axum::Router::new().serve_dioxus_application(ServeConfig::new(), App);

    // Use the address from dx serve or default to localhost:8080
    let addr = dioxus::cli_config::fullstack_address_or_localhost();
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router.into_make_service())
        .await
        .unwrap();
}

#[component]
fn App() -> Element {
    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        Router::<Route> {}
    }
}

/// Container with the navbar above whichever view the route selects.
#[component]
fn Shell() -> Element {
    rsx! {
        div {
            class: "container",
            Navbar {
                Link { class: "navbar-brand", to: Route::ExercisesList {}, "Exercise Tracker" }
                div {
                    class: "navbar-links",
                    Link { to: Route::ExercisesList {}, "Exercises" }
                    Link { to: Route::CreateExercise {}, "Log Exercise" }
                    Link { to: Route::CreateUser {}, "Add User" }
                }
            }
            Outlet::<Route> {}
        }
    }
}
