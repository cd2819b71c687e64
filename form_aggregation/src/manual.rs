/*!

This is the long-form manual for `form_aggregation` and `formsum`.

## Input formats

The following formats are supported:
* `json` Response exports in the native JSON notation
* `csv` Comma Separated Values, one response per row
* `msforms` Response spreadsheets from the Microsoft Forms and Google Forms products.

### `json`

Responses recorded in the native JSON export. The file is expected to look as follows:

```text
{
  "responses": [
    {
      "id": "r-0001",
      "answers": [
        {"questionId": "q_city", "value": "Lisbon"},
        {"questionId": "q_rating", "value": 4},
        {"questionId": "q_features", "value": ["editor", "api"]}
      ]
    }
  ]
}
```

Notes:
- the `id` of a response is optional, a default id is derived from the file name
- values may be any JSON type. Strings pass through, booleans and numbers keep
  their JSON rendering, arrays and objects are re-encoded as JSON strings
- a `null` value (or a missing `value` key) marks a skipped answer: it is not
  counted for its question

### `csv`

Simple CSV reader. Each row is one response.

```text
Respondent,Role,Years of experience,Remote
a1,Engineer,5,true
a2,Designer,3,false
```

By default the first row is a header and each question of the catalog is matched
against it, by question text first and then by question id. Columns that match no
question (such as `Respondent` above) are ignored. Empty cells are skipped
answers.

The `questionColumns` key of the file source switches to positional mode: it
lists the column of each question, in catalog order, as 1-based numbers or Excel
column letters. See the [Configuration section](#configuration).

### `msforms`

Response spreadsheets downloaded from Microsoft Forms ("Open in Excel"). This
format is also compatible with Google Forms response sheets exported to the Excel
format. The input file is expected to be in Excel (.xlsx) format.

The first row holds the question labels and is matched against the catalog the
same way as the CSV header. The extra columns of these exports (ID, start time,
completion time, email) are ignored as long as no question matches them. Rating
widgets are stored as numbers and yes/no widgets as booleans; both are rendered
so that `NUMBER`, `RATING` and `BOOLEAN` questions aggregate them directly.

If the workbook has several worksheets, the `excelWorksheetName` key (or the
`--excel-worksheet-name` flag) selects one.

## Question types

Each question of the catalog carries a `type` tag that selects the statistics of
its summary:

| type | summary |
|-------------------|---------------------------------------------------|
| `SHORT_TEXT` | most popular answers with their counts |
| `LONG_TEXT` | same as `SHORT_TEXT` |
| `SINGLE_CHOICE` | same as `SHORT_TEXT` |
| `DROPDOWN` | same as `SHORT_TEXT` |
| `NUMBER` | `min`, `max` and `average` of the parseable values |
| `RATING` | same as `NUMBER` |
| `MULTIPLE_CHOICE` | counts per selected option |
| `BOOLEAN` | `trueCount` and `falseCount` |

Any other tag is accepted: the question is echoed in the summary with its answer
count but without statistics. Values that do not parse for their question type
(a non-numeric answer to a `NUMBER` question, a malformed selection list) are
excluded from the statistics but still counted in `totalResponsesForQuestion`.

## Configuration

`formsum` accepts a configuration file in JSON that describes the whole report.

```text
{
  "outputSettings": {
    "templateTitle": "Developer survey",
    "templateId": "tpl-042",
    "templateAuthor": "ops@example.com",
    "outputDirectory": "reports"
  },
  "responseFileSources": [
    {"provider": "json", "filePath": "responses.json"}
  ],
  "questions": [
    {"id": "q_city", "text": "Your city", "type": "SHORT_TEXT"},
    {"id": "q_rating", "text": "Rate the event", "type": "RATING"},
    {"id": "q_features", "text": "Which features do you use?",
     "type": "MULTIPLE_CHOICE", "options": ["editor", "api", "exports"]}
  ],
  "reportOptions": {"popularAnswerLimit": 5}
}
```

Keys of a file source:
- `provider` (string): one of `json`, `csv`, `msforms`
- `filePath` (string): the location of the file, relative to the configuration file
- `questionColumns` (array of strings or numbers, optional): the column of each
  question in catalog order, for tabular inputs without a usable header. Entries
  are 1-based numbers or Excel column letters (`"a"`, `"b"`, ..., `"aa"`)
- `firstResponseRowIndex` (string or number, optional): the 1-based row at which
  the responses start. Useful with `questionColumns` when the file still carries
  a header row to skip
- `excelWorksheetName` (string, optional): for Excel-based inputs, the name of
  the worksheet

Keys of `outputSettings`:
- `templateTitle` (string): the title echoed in the summary
- `templateId`, `templateAuthor` (strings, optional): echoed in the summary
- `outputDirectory` (string, optional): if present, the summary is written to
  `summary.json` in this directory. The `--out` flag overrides it

Keys of `reportOptions`:
- `popularAnswerLimit` (number, optional, default 5): how many entries the
  popular-answer rankings keep. Must be at least 1

## Summary output

The summary is a JSON document with the template metadata and one entry per
question of the catalog, in catalog order:

```text
{
  "template": {"id": "tpl-042", "title": "Developer survey",
               "author": "ops@example.com", "totalResponses": 132},
  "results": [
    {"questionId": "q_rating", "text": "Rate the event", "type": "RATING",
     "totalResponsesForQuestion": 130, "min": 1.0, "max": 5.0, "average": 4.13}
  ]
}
```

`totalResponses` counts the parsed response records. `totalResponsesForQuestion`
counts every raw answer received for the question, including the ones its
statistics excluded. The `options` of a question are echoed only when the
catalog declares them. A `NUMBER` or `RATING` question with no parseable value
omits `min`, `max` and `average` entirely.

*/
