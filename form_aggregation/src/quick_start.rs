/*!

# Quick start with `formsum`

This example summarizes the responses of a form end to end, without writing a
configuration file.

**Creating a form** Any product with a tabular response export works. With
Microsoft Forms or Google Forms, create a form, collect a few responses and
download the response spreadsheet (`Open in Excel` in Microsoft Forms, or
export the response sheet of Google Forms to the Excel format).

**Running the report** Point `formsum` at the downloaded file and name the
format (the name of the file may differ for you):

```bash
formsum -i 'My survey (1-24).xlsx' --input-type msforms
```

Every column of the export becomes a free-text question and the most popular
answers of each column are printed as a JSON summary:

```text
[2022-11-04T18:20:51Z INFO  formsum::report] infer_question_labels: inspecting "My survey (1-24).xlsx"
[2022-11-04T18:20:51Z INFO  formsum::report] Attempting to read response file "My survey (1-24).xlsx"
[2022-11-04T18:20:51Z INFO  formsum::report] run_report: processing 24 responses
[2022-11-04T18:20:51Z INFO  form_aggregation] aggregate: processing 48 answers over 2 questions
summary:{
  "results": [
    {
      "popularAnswers": [
        {
          "answer": "Lisbon",
          "count": 11
        },
        {
          "answer": "Berlin",
          "count": 8
        }
      ],
      "questionId": "Your city",
      "text": "Your city",
      "totalResponsesForQuestion": 24,
      "type": "SHORT_TEXT"
    }
  ],
  "template": {
    "author": null,
    "id": null,
    "title": "My survey (1-24).xlsx",
    "totalResponses": 24
  }
}
```

CSV exports work the same way with `--input-type csv`. The `--questions` flag
restricts the summary to some of the columns of the export:

```bash
formsum -i responses.csv --input-type csv --questions 'Your city' --questions 'Team'
```

**Writing the summary to a file** The `--out` flag redirects the summary:

```bash
formsum -i responses.csv --input-type csv --out summary.json
```

Quick mode treats every answer as free text. For typed statistics (numeric
averages, selection counts, boolean splits), for declared options and for
combining several response files, write a configuration file and pass it with
`--config`. The configuration keys and all the input formats are documented
in the `manual` module.

*/
