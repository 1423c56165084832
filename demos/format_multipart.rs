use mailcompose::{Attachment, Message, RichText};
use tracing_subscriber::EnvFilter;

fn main() -> mailcompose::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let m = Message::builder()
        .from(("NoBody", "nobody@domain.tld"))
        .to(("Hei", "hei@domain.tld"))
        .subject("Happy new year")
        .message(
            RichText::new()
                .plain_text("Привет, мир!")
                .html_text("<p><b>Hello</b>, <i>world</i>! <img src=\"smile.png\"></p>")
                .asset(Attachment::data("smile.png", &b"<smile-raw-image-data>"[..])),
        )
        .attachment(Attachment::data("example.c", "int main() { return 0; }"))
        .build()?;

    println!("{}", m);

    Ok(())
}
