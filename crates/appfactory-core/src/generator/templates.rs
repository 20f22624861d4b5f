//! Static React templates used when no provider produces usable code.
//!
//! The template is picked from keywords found in the app name: names
//! mentioning "todo" get a small list manager, everything else gets a
//! counter.

use serde::{Deserialize, Serialize};

use appfactory_models::{escape_html, slugify, GeneratedApp};

/// Keywords recognized in app names, in reporting order.
pub const KEYWORDS: [&str; 8] = [
    "todo",
    "blog",
    "weather",
    "chat",
    "calculator",
    "notes",
    "shop",
    "portfolio",
];

/// Longest provider text embedded into a template README.
const MAX_NOTES_CHARS: usize = 4000;

/// The static template families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    /// Add / toggle / delete list items.
    TodoList,
    /// Increment / decrement / reset counter.
    Counter,
}

/// Returns the keywords contained in `app_name`, case-insensitively.
pub fn detect_keywords(app_name: &str) -> Vec<&'static str> {
    let lower = app_name.to_lowercase();
    KEYWORDS
        .iter()
        .copied()
        .filter(|k| lower.contains(k))
        .collect()
}

/// Picks the template for an app name.
pub fn select_template(app_name: &str) -> TemplateKind {
    if detect_keywords(app_name).contains(&"todo") {
        TemplateKind::TodoList
    } else {
        TemplateKind::Counter
    }
}

/// Renders the full file set of a template.
///
/// `notes` is free text from a provider that could not be parsed into
/// files; it is kept in the README instead of being dropped.
pub fn render(app_name: &str, kind: TemplateKind, notes: Option<&str>) -> GeneratedApp {
    let app_js = match kind {
        TemplateKind::TodoList => TODO_APP_JS,
        TemplateKind::Counter => COUNTER_APP_JS,
    };

    vec![
        ("package.json".to_string(), package_json(app_name)),
        ("public/index.html".to_string(), index_html(app_name)),
        ("src/index.js".to_string(), INDEX_JS.to_string()),
        (
            "src/App.js".to_string(),
            app_js.replace("__APP_NAME_JSON__", &js_string(app_name)),
        ),
        ("README.md".to_string(), readme(app_name, kind, notes)),
    ]
    .into_iter()
    .collect()
}

fn package_json(app_name: &str) -> String {
    let suffix: String = uuid::Uuid::new_v4().simple().to_string().chars().take(9).collect();
    let manifest = serde_json::json!({
        "name": format!("{}-{}", slugify(app_name), suffix),
        "version": "1.0.0",
        "private": true,
        "dependencies": {
            "react": "^18.2.0",
            "react-dom": "^18.2.0",
            "react-scripts": "5.0.1",
            "tailwindcss": "^3.3.0",
            "autoprefixer": "^10.4.14",
            "postcss": "^8.4.24"
        },
        "scripts": {
            "start": "react-scripts start",
            "build": "react-scripts build",
            "test": "react-scripts test",
            "eject": "react-scripts eject"
        },
        "browserslist": {
            "production": [">0.2%", "not dead", "not op_mini all"],
            "development": [
                "last 1 chrome version",
                "last 1 firefox version",
                "last 1 safari version"
            ]
        }
    });
    // Serializing a json! literal cannot fail.
    serde_json::to_string_pretty(&manifest).unwrap_or_default()
}

fn index_html(app_name: &str) -> String {
    INDEX_HTML.replace("__APP_NAME_HTML__", &escape_html(app_name))
}

fn readme(app_name: &str, kind: TemplateKind, notes: Option<&str>) -> String {
    let mut features: Vec<String> = vec![
        "Modern React with hooks".to_string(),
        "Responsive design with Tailwind CSS".to_string(),
    ];
    features.push(match kind {
        TemplateKind::TodoList => "Add, complete and delete tasks".to_string(),
        TemplateKind::Counter => "Interactive counter".to_string(),
    });
    let keywords = detect_keywords(app_name);
    if !keywords.is_empty() {
        features.push(format!("Detected themes: {}", keywords.join(", ")));
    }

    let mut out = format!(
        "# {name}\n\nA {lower} application created by AI.\n\n## Features\n\n",
        name = app_name,
        lower = app_name.to_lowercase()
    );
    for feature in &features {
        out.push_str(&format!("- {}\n", feature));
    }
    out.push_str(README_USAGE);

    if let Some(notes) = notes.map(str::trim).filter(|n| !n.is_empty()) {
        let clipped: String = notes.chars().take(MAX_NOTES_CHARS).collect();
        out.push_str("\n## AI Notes\n\n");
        out.push_str(&clipped);
        out.push('\n');
    }
    out
}

/// Encodes `s` as a JavaScript string literal.
fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}


const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <meta name="theme-color" content="#000000" />
    <meta name="description" content="__APP_NAME_HTML__ - Created by AI" />
    <title>__APP_NAME_HTML__</title>
    <script src="https://cdn.tailwindcss.com"></script>
  </head>
  <body>
    <noscript>You need to enable JavaScript to run this app.</noscript>
    <div id="root"></div>
  </body>
</html>
"##;

const INDEX_JS: &str = r#"import React from 'react';
import ReactDOM from 'react-dom/client';
import App from './App';

const root = ReactDOM.createRoot(document.getElementById('root'));
root.render(<App />);
"#;

const COUNTER_APP_JS: &str = r#"import React, { useState } from 'react';

const APP_NAME = __APP_NAME_JSON__;

function App() {
  const [count, setCount] = useState(0);

  return (
    <div className="min-h-screen bg-gradient-to-br from-blue-50 to-indigo-100">
      <div className="container mx-auto px-4 py-8">
        <div className="max-w-4xl mx-auto">
          <header className="text-center mb-12">
            <h1 className="text-5xl font-bold text-gray-800 mb-4">{APP_NAME}</h1>
            <p className="text-xl text-gray-600">
              A beautiful {APP_NAME.toLowerCase()} app created by AI
            </p>
          </header>

          <main className="bg-white rounded-2xl shadow-xl p-8 text-center">
            <div className="text-6xl font-bold text-blue-600 mb-4">{count}</div>
            <p className="text-gray-600 mb-6">Click the buttons to interact with your app!</p>
            <div className="space-x-4">
              <button
                onClick={() => setCount(count + 1)}
                className="bg-blue-600 hover:bg-blue-700 text-white font-bold py-3 px-6 rounded-lg"
              >
                Increment
              </button>
              <button
                onClick={() => setCount(count - 1)}
                className="bg-red-600 hover:bg-red-700 text-white font-bold py-3 px-6 rounded-lg"
              >
                Decrement
              </button>
              <button
                onClick={() => setCount(0)}
                className="bg-gray-600 hover:bg-gray-700 text-white font-bold py-3 px-6 rounded-lg"
              >
                Reset
              </button>
            </div>
          </main>
        </div>
      </div>
    </div>
  );
}

export default App;
"#;

const TODO_APP_JS: &str = r#"import React, { useState } from 'react';

const APP_NAME = __APP_NAME_JSON__;

function App() {
  const [items, setItems] = useState([]);
  const [text, setText] = useState('');

  const addItem = (event) => {
    event.preventDefault();
    const value = text.trim();
    if (!value) return;
    setItems([...items, { id: Date.now(), text: value, done: false }]);
    setText('');
  };

  const toggleItem = (id) => {
    setItems(items.map((item) => (item.id === id ? { ...item, done: !item.done } : item)));
  };

  const removeItem = (id) => {
    setItems(items.filter((item) => item.id !== id));
  };

  const remaining = items.filter((item) => !item.done).length;

  return (
    <div className="min-h-screen bg-gradient-to-br from-green-50 to-emerald-100">
      <div className="container mx-auto px-4 py-8">
        <div className="max-w-xl mx-auto">
          <header className="text-center mb-8">
            <h1 className="text-4xl font-bold text-gray-800 mb-2">{APP_NAME}</h1>
            <p className="text-gray-600">{remaining} of {items.length} tasks left</p>
          </header>

          <main className="bg-white rounded-2xl shadow-xl p-6">
            <form onSubmit={addItem} className="flex gap-2 mb-6">
              <input
                value={text}
                onChange={(event) => setText(event.target.value)}
                placeholder="What needs to be done?"
                className="flex-1 border border-gray-300 rounded-lg px-4 py-2"
              />
              <button
                type="submit"
                className="bg-emerald-600 hover:bg-emerald-700 text-white font-bold px-4 py-2 rounded-lg"
              >
                Add
              </button>
            </form>

            <ul className="space-y-2">
              {items.map((item) => (
                <li key={item.id} className="flex items-center justify-between border-b pb-2">
                  <label className="flex items-center gap-3">
                    <input type="checkbox" checked={item.done} onChange={() => toggleItem(item.id)} />
                    <span className={item.done ? 'line-through text-gray-400' : 'text-gray-800'}>
                      {item.text}
                    </span>
                  </label>
                  <button onClick={() => removeItem(item.id)} className="text-red-500 hover:text-red-700">
                    Delete
                  </button>
                </li>
              ))}
            </ul>
          </main>
        </div>
      </div>
    </div>
  );
}

export default App;
"#;

const README_USAGE: &str = r#"
## Getting Started

1. Install dependencies:
   ```bash
   npm install
   ```

2. Start the development server:
   ```bash
   npm start
   ```

3. Open [http://localhost:3000](http://localhost:3000) to view it in the browser.

## Build for Production

```bash
npm run build
```

## Created By

This app was automatically generated by an AI assistant via Telegram bot.
"#;
