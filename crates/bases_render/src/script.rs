/// Client-side tab controller for rendered fragments.
///
/// Runs on the host's `nav` event and pairs each `.base-tab` button with the
/// `.base-view` block of the same container carrying the same
/// `data-view-index`. Exactly one block stays visible per container.
pub const TAB_CONTROLLER_SCRIPT: &str = r#"document.addEventListener("nav", () => {
  for (const container of document.querySelectorAll(".base-container")) {
    const tabs = container.querySelectorAll(":scope > .base-tabs > .base-tab")
    const views = container.querySelectorAll(":scope > .base-view")
    for (const tab of tabs) {
      const onClick = () => {
        const index = tab.dataset.viewIndex
        for (const other of tabs) other.classList.toggle("active", other === tab)
        for (const view of views) {
          view.style.display = view.dataset.viewIndex === index ? "" : "none"
        }
      }
      tab.addEventListener("click", onClick)
      if (window.addCleanup) window.addCleanup(() => tab.removeEventListener("click", onClick))
    }
  }
})
"#;

/// The controller wrapped in a `<script>` element.
pub fn script_tag() -> String {
    format!("<script>\n{TAB_CONTROLLER_SCRIPT}</script>")
}
