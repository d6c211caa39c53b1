//! Demonstration of state managers and connected components: a profile card

use scoped_store::{connect, Managers, Props, StateManager};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug)]
struct User {
    forename: String,
    surname: String,
}

enum UserAction {
    Rename { forename: String, surname: String },
}

#[derive(Clone, Debug)]
struct Likes {
    count: i32,
}

enum LikesAction {
    Like,
    Dislike,
}

fn card(props: Props) -> String {
    format!(
        "+--------------------------+\n| {:<24} |\n| {:<24} |\n+--------------------------+",
        props.str("name").unwrap_or_default(),
        format!("{} likes", props.get::<i32>("likes").copied().unwrap_or_default()),
    )
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Profile Card Example ===\n");

    let user = StateManager::named(
        "user",
        |_: &User, action: UserAction| match action {
            UserAction::Rename { forename, surname } => User { forename, surname },
        },
        User {
            forename: "Susan".to_string(),
            surname: "Barnes".to_string(),
        },
    );
    let likes = StateManager::named(
        "likes",
        |state: &Likes, action: LikesAction| match action {
            LikesAction::Like => Likes {
                count: state.count + 1,
            },
            LikesAction::Dislike => Likes {
                count: state.count - 1,
            },
        },
        Likes { count: 5 },
    );

    let profile = connect(Managers::new().with("user", &user).with("likes", &likes))
        .map_state_to_props(|state, _| {
            let (Some(user), Some(likes)) = (state.get::<User>("user"), state.get::<Likes>("likes"))
            else {
                return Props::new();
            };
            Props::new()
                .with("name", format!("{} {}", user.forename, user.surname))
                .with("likes", likes.count)
        })
        .map_dispatch_to_props(|dispatch, _| {
            let likes = dispatch.get::<LikesAction>("likes");
            let dislikes = likes.clone();
            let user = dispatch.get::<UserAction>("user");
            Props::new()
                .with_callback("on_like", move || likes.dispatch(LikesAction::Like))
                .with_callback("on_dislike", move || dislikes.dispatch(LikesAction::Dislike))
                .with_callback("on_rename", move || {
                    user.dispatch(UserAction::Rename {
                        forename: "Alex".to_string(),
                        surname: "Higgins".to_string(),
                    })
                })
        })
        .wrap(|props: Props| props);

    // Mount the providers
    let user_provider = user.provider();
    let likes_provider = likes.provider();
    let render = || {
        user_provider.scope(|| likes_provider.scope(|| profile.render(Props::new())))
    };

    let click = |name: &str| match render() {
        Ok(props) => {
            if let Some(callback) = props.callback(name) {
                println!("-> {name}");
                callback.call();
            }
        }
        Err(err) => eprintln!("render failed: {err}"),
    };

    println!("1. Initial render");
    if let Ok(props) = render() {
        println!("{}\n", card(props));
    }

    println!("2. Liking three times and disliking once");
    for _ in 0..3 {
        click("on_like");
    }
    click("on_dislike");
    if let Ok(props) = render() {
        println!("{}\n", card(props));
    }

    println!("3. Renaming");
    click("on_rename");
    if let Ok(props) = render() {
        println!("{}\n", card(props));
    }

    println!("4. Rendering outside the providers");
    if let Err(err) = profile.render(Props::new()) {
        println!("   {err}");
    }

    println!("\n✓ Example complete!");
}
