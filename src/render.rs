//! HTML for the single-page screening tool.

use crate::{Band, DescribeOutcome, DescriptorVector, Prediction, DISCLAIMER, INVALID_SMILES_MESSAGE};

pub const GLOBAL_STYLES: &str = r#"
body {
		font-family: 'Helvetica Neue', Helvetica, Arial, sans-serif;
		background: #f5f7fa;
		color: #333;
		margin: 20px;
		padding: 0;
}
.container {
		max-width: 900px;
		margin: 50px auto;
		background: #ffffff;
		padding: 40px;
		border-radius: 8px;
		box-shadow: 0 2px 10px rgba(0, 0, 0, 0.1);
}
h1 {
		font-size: 2.5rem;
		margin-bottom: 5px;
		color: #222;
		text-align: center;
}
.subtitle {
		text-align: center;
		color: #555;
		margin-bottom: 30px;
}
form {
		display: flex;
		flex-direction: column;
		gap: 20px;
}
label {
		font-weight: bold;
		margin-bottom: 5px;
}
input[type="text"] {
		width: 100%;
		padding: 10px;
		font-size: 1rem;
		border: 1px solid #ccc;
		border-radius: 4px;
}
input[type="submit"] {
		padding: 12px;
		background-color: #007BFF;
		color: #fff;
		border: none;
		border-radius: 4px;
		font-size: 1.1rem;
		cursor: pointer;
		transition: background-color 0.3s ease;
}
input[type="submit"]:hover {
		background-color: #0056b3;
}
table {
		width: 100%;
		border-collapse: collapse;
		margin: 20px 0;
}
th, td {
		padding: 8px 12px;
		border: 1px solid #ddd;
		text-align: right;
}
th {
		background: #f0f2f6;
}
.metric-label {
		color: #555;
}
.metric-value {
		font-size: 2.2rem;
		font-weight: bold;
		margin: 5px 0 15px 0;
}
.progress {
		width: 100%;
		height: 10px;
		background: #e6e9ef;
		border-radius: 5px;
		overflow: hidden;
		margin-bottom: 20px;
}
.progress-fill {
		height: 100%;
		background: #007BFF;
}
.alert {
		padding: 15px;
		color: white;
		margin: 20px 0;
		border-radius: 4px;
}
.alert.error {
		background-color: #f44336;
}
.alert.warning {
		background-color: #ff9800;
}
.alert.success {
		background-color: #4caf50;
}
.alert.info {
		background-color: #2196f3;
}
"#;

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn page(smiles: &str, body: &str) -> String {
    let smiles = escape_html(smiles);
    format!(
        r#"<!DOCTYPE html>
<html>
	<head>
		<meta charset="utf-8">
		<title>BreastCanAI</title>
		<style>
			{GLOBAL_STYLES}
		</style>
	</head>
	<body>
		<div class="container">
			<h1>🧬 BreastCanAI</h1>
			<p class="subtitle">AI-based ligand screening for breast cancer drug discovery</p>
			<form action="/describe" method="post">
				<label for="smiles">
					Enter ligand SMILES string
					<input type="text" id="smiles" name="smiles" value="{smiles}" placeholder="e.g. CC(=O)Oc1ccccc1C(=O)O">
				</label>
				<input type="submit" value="Calculate Descriptors">
			</form>
			{body}
		</div>
	</body>
</html>
"#
    )
}

fn descriptor_table(descriptors: &DescriptorVector) -> String {
    let rows = descriptors.rows();
    let header: String = rows.iter().map(|(name, _)| format!("<th>{name}</th>")).collect();
    let cells: String = rows.iter().map(|(_, value)| format!("<td>{value}</td>")).collect();
    format!(
        r#"<h2>📊 Calculated Molecular Descriptors</h2>
			<table>
				<tr>{header}</tr>
				<tr>{cells}</tr>
			</table>"#
    )
}

fn predict_button(smiles: &str) -> String {
    format!(
        r#"<form action="/predict" method="post">
				<input type="hidden" name="smiles" value="{}">
				<input type="submit" value="Predict Breast Cancer Therapeutic Potential">
			</form>"#,
        escape_html(smiles)
    )
}

fn banner_class(band: Band) -> &'static str {
    match band {
        Band::High => "success",
        Band::Moderate => "warning",
        Band::Low => "error",
    }
}

fn prediction_section(prediction: &Prediction) -> String {
    let result = match prediction {
        Prediction::Scored(verdict) => format!(
            r#"<div class="metric-label">Predicted Therapeutic Probability</div>
			<div class="metric-value">{percentage:.2} %</div>
			<div class="progress"><div class="progress-fill" style="width: {percentage:.2}%"></div></div>
			<div class="alert {class}">{message}</div>"#,
            percentage = verdict.percentage,
            class = banner_class(verdict.band),
            message = verdict.band.message(),
        ),
        Prediction::Failed { message } => {
            format!(r#"<div class="alert error">{}</div>"#, escape_html(message))
        }
    };
    format!(
        r#"<h2>🧠 AI Prediction Result</h2>
			{result}
			<div class="alert info">{DISCLAIMER}</div>"#
    )
}

pub fn index_page() -> String {
    page("", "")
}

/// The tool after a describe or predict action. Blank input renders the
/// bare form; invalid input renders the form with an error.
pub fn screening_page(outcome: &DescribeOutcome, prediction: Option<&Prediction>) -> String {
    match outcome {
        DescribeOutcome::Empty => index_page(),
        DescribeOutcome::Invalid { input, .. } => page(
            input,
            &format!(r#"<div class="alert error">❌ {INVALID_SMILES_MESSAGE}</div>"#),
        ),
        DescribeOutcome::Described {
            smiles,
            descriptors,
        } => {
            let mut body = descriptor_table(descriptors);
            body.push_str(&predict_button(smiles));
            if let Some(prediction) = prediction {
                body.push_str(&prediction_section(prediction));
            }
            page(smiles, &body)
        }
    }
}
