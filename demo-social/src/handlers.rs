use axum::response::Html;

use social_login_axum::SOCIAL_ROUTE_PREFIX;

pub(crate) async fn index() -> Html<String> {
    let prefix = SOCIAL_ROUTE_PREFIX.as_str();
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<body>
    <h1>Demo shop</h1>
    <ul>
        <li><a href="{prefix}/connect/google?client=redirect">Sign in with Google</a></li>
        <li><a href="{prefix}/connect/facebook?client=redirect">Sign in with Facebook</a></li>
    </ul>
</body>
</html>"#
    ))
}

pub(crate) async fn login() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<body>
    <h1>Login</h1>
    <p>Use one of the social login buttons on the home page, or check the
    <code>error</code> query parameter if you were sent here after a failure.</p>
</body>
</html>"#,
    )
}
